//! Per-job analysis engine.
//!
//! Runs one generation call per retrieved job through the failover service,
//! parses the response into a [`JobAnalysis`], and substitutes a
//! deterministic heuristic record whenever anything goes wrong. The batch
//! call never fails and always yields one record per job in input order.

use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use job_match_store::JobMatch;
use llm_failover::FailoverService;
use tracing::{debug, info, warn};

use crate::{
    errors::AnalysisError,
    extract::extract_json,
    prompt::analysis_prompt,
    records::{
        CareerAdvice, JobAnalysis, JobContext, MatchAssessment, MatchPercent, Recommendations,
        ResumeProfile, SkillGapBreakdown,
    },
};

/// Tuning knobs for the analysis batch.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Jobs analyzed concurrently.
    pub concurrency: usize,
    /// Optional deadline per job; elapsing degrades to a fallback record.
    pub per_job_timeout: Option<Duration>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            per_job_timeout: None,
            max_tokens: Some(2000),
            temperature: Some(0.3),
        }
    }
}

/// Analysis engine over a shared generation service.
pub struct SkillGapEngine {
    svc: Arc<FailoverService>,
    opts: EngineOptions,
}

impl SkillGapEngine {
    pub fn new(svc: Arc<FailoverService>) -> Self {
        Self {
            svc,
            opts: EngineOptions::default(),
        }
    }

    pub fn with_options(svc: Arc<FailoverService>, opts: EngineOptions) -> Self {
        Self { svc, opts }
    }

    /// Analyzes the resume against every job. Infallible by construction:
    /// per-job failures become fallback records tagged with
    /// `analysis_error`, and records come back in input order.
    pub async fn analyze(&self, resume: &ResumeProfile, jobs: &[JobMatch]) -> Vec<JobAnalysis> {
        info!(jobs = jobs.len(), "starting skill gap analysis");

        let mut indexed: Vec<(usize, JobAnalysis)> = stream::iter(jobs.iter().enumerate())
            .map(|(i, job)| async move {
                let record = match self.analyze_one(resume, job).await {
                    Ok(a) => a,
                    Err(e) => {
                        warn!(job = %job.title, error = %e, "analysis failed, using fallback");
                        fallback_analysis(resume, job, &e.to_string())
                    }
                };
                (i, record)
            })
            .buffer_unordered(self.opts.concurrency.max(1))
            .collect()
            .await;

        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, a)| a).collect()
    }

    /// One job through generation, extraction, and shaping.
    async fn analyze_one(
        &self,
        resume: &ResumeProfile,
        job: &JobMatch,
    ) -> Result<JobAnalysis, AnalysisError> {
        let fut = self.run_analysis(resume, job);
        match self.opts.per_job_timeout {
            Some(deadline) => tokio::time::timeout(deadline, fut)
                .await
                .map_err(|_| AnalysisError::Timeout(deadline))?,
            None => fut.await,
        }
    }

    async fn run_analysis(
        &self,
        resume: &ResumeProfile,
        job: &JobMatch,
    ) -> Result<JobAnalysis, AnalysisError> {
        let prompt = analysis_prompt(resume, job);
        let res = self
            .svc
            .ask(&prompt, self.opts.max_tokens, self.opts.temperature)
            .await?;

        debug!(
            job = %job.title,
            provider = %res.provider,
            response_len = res.text.len(),
            "analysis response received"
        );

        let value = extract_json(&res.text)?;
        let mut analysis: JobAnalysis = serde_json::from_value(value)?;
        analysis.job_info = job_context(job);
        analysis.analysis_error = None;
        Ok(analysis)
    }
}

fn job_context(job: &JobMatch) -> JobContext {
    JobContext {
        title: job.title.clone(),
        company: job.company.clone(),
        location: job.location.clone(),
        apply_link: job.apply_link.clone(),
        similarity_score: job.score,
    }
}

/// Heuristic record produced when generation or parsing fails.
///
/// Matching skills come from a case-insensitive substring scan of the job
/// title and description; everything else is fixed copy flagging the record
/// for manual review.
pub fn fallback_analysis(resume: &ResumeProfile, job: &JobMatch, reason: &str) -> JobAnalysis {
    let job_text = format!("{} {}", job.description, job.title).to_lowercase();
    let matching_skills: Vec<String> = resume
        .skills
        .iter()
        .filter(|s| !s.trim().is_empty() && job_text.contains(&s.to_lowercase()))
        .cloned()
        .collect();

    JobAnalysis {
        job_info: job_context(job),
        skill_gap_analysis: SkillGapBreakdown {
            matching_skills,
            missing_skills: vec!["Analysis failed - manual review needed".into()],
            skill_level_gaps: vec!["Analysis failed - manual review needed".into()],
            transferable_skills: resume.skills.iter().take(3).cloned().collect(),
        },
        recommendations: Recommendations {
            priority_skills_to_learn: vec!["Review job description manually".into()],
            learning_resources: vec![
                "Coursera".into(),
                "Udemy".into(),
                "LinkedIn Learning".into(),
            ],
            project_suggestions: vec!["Build portfolio projects".into()],
            timeline_estimate: "Review needed".into(),
        },
        job_match_assessment: MatchAssessment {
            overall_match_percentage: MatchPercent::Text("Unable to calculate".into()),
            strengths: vec!["Experience in relevant field".into()],
            concerns: vec!["Analysis system error".into()],
            interview_preparation_tips: vec![
                "Research the company".into(),
                "Prepare STAR examples".into(),
            ],
        },
        career_advice: CareerAdvice {
            application_readiness: "needs_review".into(),
            cover_letter_focus: vec!["Highlight relevant experience".into()],
            networking_suggestions: vec!["LinkedIn connections".into()],
            alternative_roles: vec!["Similar positions in the field".into()],
        },
        analysis_error: Some(reason.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use llm_failover::{
        ProviderConfig, RetryPolicy,
        backends::{BackendFactory, GenerationBackend, GenerationRequest},
        errors::ProviderError,
    };

    struct CannedBackend {
        responses: Mutex<Vec<String>>,
    }

    impl GenerationBackend for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        fn generate<'a>(
            &'a self,
            _req: &'a GenerationRequest,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<String, ProviderError>> + Send + 'a>,
        > {
            Box::pin(async move {
                let mut responses = self.responses.lock().unwrap();
                if responses.len() > 1 {
                    Ok(responses.remove(0))
                } else {
                    Ok(responses[0].clone())
                }
            })
        }
    }

    struct StallingBackend;

    impl GenerationBackend for StallingBackend {
        fn name(&self) -> &str {
            "stalling"
        }

        fn generate<'a>(
            &'a self,
            _req: &'a GenerationRequest,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<String, ProviderError>> + Send + 'a>,
        > {
            Box::pin(std::future::pending())
        }
    }

    enum Mode {
        Canned(Vec<String>),
        Failing,
        Stalling,
    }

    struct TestFactory(Mutex<Option<Mode>>);

    impl BackendFactory for TestFactory {
        fn build(
            &self,
            _cfg: &ProviderConfig,
        ) -> Result<std::sync::Arc<dyn GenerationBackend>, ProviderError> {
            match self.0.lock().unwrap().take() {
                Some(Mode::Canned(responses)) => Ok(std::sync::Arc::new(CannedBackend {
                    responses: Mutex::new(responses),
                })),
                Some(Mode::Stalling) => Ok(std::sync::Arc::new(StallingBackend)),
                Some(Mode::Failing) | None => Err(ProviderError::Init("unavailable".into())),
            }
        }
    }

    fn service(mode: Mode) -> Arc<FailoverService> {
        let mut cfg = ProviderConfig::groq("test-key");
        cfg.max_retries = 0;
        Arc::new(
            FailoverService::with_factory(
                vec![cfg],
                RetryPolicy {
                    base_delay: Duration::ZERO,
                    multiplier: 2.0,
                },
                Box::new(TestFactory(Mutex::new(Some(mode)))),
            )
            .unwrap(),
        )
    }

    fn resume() -> ResumeProfile {
        ResumeProfile {
            skills: vec!["Python".into(), "SQL".into(), "Docker".into(), "Git".into()],
            experience: "3 years backend".into(),
            ..Default::default()
        }
    }

    fn job(id: &str, title: &str, description: &str) -> JobMatch {
        JobMatch {
            job_id: id.into(),
            score: 0.7,
            title: title.into(),
            company: "Acme".into(),
            location: "Remote".into(),
            apply_link: String::new(),
            description: description.into(),
        }
    }

    #[tokio::test]
    async fn successful_analysis_parses_and_carries_job_info() {
        let body = r#"{"skill_gap_analysis": {"matching_skills": ["Python"], "missing_skills": ["Kubernetes"]}, "job_match_assessment": {"overall_match_percentage": "80%"}}"#;
        let svc = service(Mode::Canned(vec![body.to_string()]));
        let engine = SkillGapEngine::new(svc);

        let out = engine
            .analyze(&resume(), &[job("j1", "Backend Dev", "Python and Kubernetes")])
            .await;

        assert_eq!(out.len(), 1);
        let a = &out[0];
        assert!(a.analysis_error.is_none());
        assert_eq!(a.job_info.title, "Backend Dev");
        assert_eq!(a.skill_gap_analysis.missing_skills, vec!["Kubernetes"]);
        assert_eq!(
            a.job_match_assessment.overall_match_percentage.as_f64(),
            Some(80.0)
        );
    }

    #[tokio::test]
    async fn provider_failure_yields_one_fallback_per_job_in_order() {
        let svc = service(Mode::Failing);
        let engine = SkillGapEngine::new(svc);

        let jobs = vec![
            job("j1", "Python Developer", "Python and SQL daily"),
            job("j2", "Frontend Engineer", "React and CSS"),
            job("j3", "Data Engineer", "SQL pipelines with Docker"),
        ];
        let out = engine.analyze(&resume(), &jobs).await;

        assert_eq!(out.len(), 3);
        for (a, j) in out.iter().zip(&jobs) {
            assert_eq!(a.job_info.title, j.title);
            assert!(a.analysis_error.is_some());
            assert_eq!(
                a.skill_gap_analysis.missing_skills,
                vec!["Analysis failed - manual review needed"]
            );
        }
        // substring scan picks up only skills present in each job's text
        assert_eq!(out[0].skill_gap_analysis.matching_skills, vec!["Python", "SQL"]);
        assert!(out[1].skill_gap_analysis.matching_skills.is_empty());
        assert_eq!(out[2].skill_gap_analysis.matching_skills, vec!["SQL", "Docker"]);
    }

    #[tokio::test]
    async fn unparseable_response_degrades_to_fallback() {
        let svc = service(Mode::Canned(vec!["sorry, I cannot help with that".into()]));
        let engine = SkillGapEngine::new(svc);

        let out = engine.analyze(&resume(), &[job("j1", "Dev", "code")]).await;
        assert_eq!(out.len(), 1);
        assert!(out[0].analysis_error.is_some());
        assert_eq!(
            out[0].career_advice.application_readiness,
            "needs_review"
        );
    }

    #[tokio::test]
    async fn mixed_batch_keeps_every_record_and_tags_only_failures() {
        let valid = r#"{"skill_gap_analysis": {"matching_skills": ["SQL"]}}"#;
        let svc = service(Mode::Canned(vec![
            valid.to_string(),
            "not json at all".to_string(),
            "still not json".to_string(),
        ]));
        let engine = SkillGapEngine::new(svc);

        let jobs = vec![
            job("j1", "A", "a"),
            job("j2", "B", "b"),
            job("j3", "C", "c"),
        ];
        let out = engine.analyze(&resume(), &jobs).await;

        assert_eq!(out.len(), 3);
        let failed = out.iter().filter(|a| a.analysis_error.is_some()).count();
        assert_eq!(failed, 2);
        let ok = out.iter().find(|a| a.analysis_error.is_none()).unwrap();
        assert_eq!(ok.skill_gap_analysis.matching_skills, vec!["SQL"]);
    }

    #[tokio::test]
    async fn per_job_deadline_degrades_to_fallback() {
        let svc = service(Mode::Stalling);
        let engine = SkillGapEngine::with_options(
            svc,
            EngineOptions {
                per_job_timeout: Some(Duration::from_millis(20)),
                ..Default::default()
            },
        );

        let out = engine.analyze(&resume(), &[job("j1", "Dev", "code")]).await;
        assert_eq!(out.len(), 1);
        let reason = out[0].analysis_error.as_deref().unwrap();
        assert!(reason.contains("timed out"));
    }

    #[test]
    fn fallback_transferable_skills_are_first_three() {
        let a = fallback_analysis(&resume(), &job("j", "t", "d"), "boom");
        assert_eq!(
            a.skill_gap_analysis.transferable_skills,
            vec!["Python", "SQL", "Docker"]
        );
        assert_eq!(a.analysis_error.as_deref(), Some("boom"));
    }
}
