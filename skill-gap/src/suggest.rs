//! Job-search keyword suggestions from a resume.

use llm_failover::FailoverService;
use tracing::warn;

use crate::{extract::extract_json, prompt::keyword_prompt, records::ResumeProfile};

/// Suggests four job titles/keywords to search with.
///
/// Falls back to static lists keyed off the dominant resume skill when the
/// model call fails or answers with anything but a string array.
pub async fn suggest_job_keywords(svc: &FailoverService, resume: &ResumeProfile) -> Vec<String> {
    let prompt = keyword_prompt(resume);

    match svc.ask(&prompt, Some(200), Some(0.3)).await {
        Ok(res) => match extract_json(&res.text) {
            Ok(serde_json::Value::Array(items)) => {
                let keywords: Vec<String> = items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if keywords.is_empty() {
                    fallback_keywords(resume)
                } else {
                    keywords
                }
            }
            Ok(_) => {
                warn!("keyword suggestion returned non-array JSON");
                fallback_keywords(resume)
            }
            Err(e) => {
                warn!(error = %e, "keyword suggestion response had no JSON");
                fallback_keywords(resume)
            }
        },
        Err(e) => {
            warn!(error = %e, "keyword suggestion call failed");
            fallback_keywords(resume)
        }
    }
}

fn fallback_keywords(resume: &ResumeProfile) -> Vec<String> {
    let has = |needle: &str| {
        resume
            .skills
            .iter()
            .any(|s| s.to_lowercase().contains(needle))
    };

    let list: [&str; 4] = if has("python") {
        ["Python Developer", "Software Engineer", "Data Analyst", "Backend Developer"]
    } else if has("java") {
        ["Java Developer", "Software Engineer", "Full Stack Developer", "Backend Developer"]
    } else {
        ["Software Developer", "IT Specialist", "Technical Analyst", "Software Engineer"]
    };
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume_with(skills: &[&str]) -> ResumeProfile {
        ResumeProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn python_resume_gets_python_fallbacks() {
        let kws = fallback_keywords(&resume_with(&["Python", "SQL"]));
        assert_eq!(kws[0], "Python Developer");
    }

    #[test]
    fn java_resume_gets_java_fallbacks() {
        let kws = fallback_keywords(&resume_with(&["JavaScript", "Java EE"]));
        // substring check matches java inside javascript too, python wins only
        // when present; here the java arm applies
        assert_eq!(kws[0], "Java Developer");
    }

    #[test]
    fn generic_resume_gets_generic_fallbacks() {
        let kws = fallback_keywords(&resume_with(&["Excel"]));
        assert_eq!(kws.len(), 4);
        assert_eq!(kws[0], "Software Developer");
    }
}
