//! Input and output record shapes plus pure normalization helpers.
//!
//! Upstream job feeds disagree on field names (`company` vs `company_name`,
//! `apply_link` vs `apply_url` vs `share_link`), so normalization lives here
//! as pure functions that tests can drive without a running index.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One job posting as ingested from a feed.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JobPosting {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "company")]
    pub company_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "apply_url", alias = "share_link")]
    pub apply_link: String,
}

impl JobPosting {
    /// Text fed to the embedding pipeline. Matches the payload so stored
    /// vectors and stored metadata describe the same document.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} at {} in {}. {}",
            self.title, self.company_name, self.location, self.description
        )
    }
}

/// One normalized similarity hit.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct JobMatch {
    pub job_id: String,
    pub score: f32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub apply_link: String,
    pub description: String,
}

/// Builds a [`JobMatch`] from a raw payload, resolving aliased field names.
///
/// Precedence per field: `title` then `job_title`; `company` then
/// `company_name`; `apply_link` then `apply_url` then `share_link`. Missing
/// fields become empty strings.
pub fn match_from_payload(id: String, score: f32, payload: &serde_json::Value) -> JobMatch {
    JobMatch {
        job_id: id,
        score,
        title: first_str(payload, &["title", "job_title"]),
        company: first_str(payload, &["company", "company_name"]),
        location: first_str(payload, &["location"]),
        apply_link: first_str(payload, &["apply_link", "apply_url", "share_link"]),
        description: first_str(payload, &["description"]),
    }
}

/// Drops repeated match ids, keeping the first (highest-scored) occurrence,
/// and truncates to `top_k`.
pub fn dedup_matches(hits: Vec<JobMatch>, top_k: usize) -> Vec<JobMatch> {
    let mut seen: HashSet<String> = HashSet::with_capacity(hits.len());
    let mut out = Vec::with_capacity(top_k.min(hits.len()));

    for hit in hits {
        if !seen.insert(hit.job_id.clone()) {
            debug!(job_id = %hit.job_id, "dropping duplicate match");
            continue;
        }
        out.push(hit);
        if out.len() == top_k {
            break;
        }
    }
    out
}

/// First non-empty string among `keys` in `payload`.
fn first_str(payload: &serde_json::Value, keys: &[&str]) -> String {
    for k in keys {
        if let Some(s) = payload.get(*k).and_then(|v| v.as_str()) {
            if !s.trim().is_empty() {
                return s.to_string();
            }
        }
    }
    String::new()
}
