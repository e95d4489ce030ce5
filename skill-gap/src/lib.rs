//! Skill gap analysis between a resume and retrieved job postings.
//!
//! Goals:
//! - Pull a strict JSON analysis out of loosely formatted model output
//!   (envelope wrappers, code fences, commentary) without ever panicking.
//! - Produce exactly one analysis record per job, falling back to a
//!   deterministic heuristic record when generation fails.
//! - Aggregate per-job analyses into one report with skill frequencies and a
//!   readiness tier.

pub mod engine;
pub mod errors;
pub mod extract;
pub mod prompt;
pub mod records;
pub mod report;
pub mod suggest;

pub use engine::{EngineOptions, SkillGapEngine};
pub use errors::{AnalysisError, ExtractError};
pub use extract::extract_json;
pub use records::{JobAnalysis, JobContext, ResumeProfile};
pub use report::{SkillGapReport, generate_report};
pub use suggest::suggest_job_keywords;
