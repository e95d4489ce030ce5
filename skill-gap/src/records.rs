//! Analysis record shapes.
//!
//! Everything deserialized from model output uses `#[serde(default)]` so a
//! model omitting a list yields an empty list, not a parse failure.

use serde::{Deserialize, Serialize};

/// Structured resume content driving prompts and embeddings.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResumeProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub projects: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub email: String,
}

impl ResumeProfile {
    /// Flat text for the embedding pipeline.
    pub fn embedding_text(&self) -> String {
        format!(
            "Skills: {}. Experience: {}. Education: {}. Projects: {}. {}",
            self.skills.join(", "),
            self.experience,
            self.education,
            self.projects,
            self.summary
        )
    }
}

/// Job the analysis ran against, echoed into each record.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct JobContext {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub apply_link: String,
    #[serde(default)]
    pub similarity_score: f32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SkillGapBreakdown {
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub skill_level_gaps: Vec<String>,
    #[serde(default)]
    pub transferable_skills: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Recommendations {
    #[serde(default)]
    pub priority_skills_to_learn: Vec<String>,
    #[serde(default)]
    pub learning_resources: Vec<String>,
    #[serde(default)]
    pub project_suggestions: Vec<String>,
    #[serde(default)]
    pub timeline_estimate: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MatchAssessment {
    #[serde(default)]
    pub overall_match_percentage: MatchPercent,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub interview_preparation_tips: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CareerAdvice {
    #[serde(default)]
    pub application_readiness: String,
    #[serde(default)]
    pub cover_letter_focus: Vec<String>,
    #[serde(default)]
    pub networking_suggestions: Vec<String>,
    #[serde(default)]
    pub alternative_roles: Vec<String>,
}

/// Match percentage as models actually emit it: a number, `"75"`, `"75%"`,
/// or prose like `"Unable to calculate"`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MatchPercent {
    Number(f64),
    Text(String),
}

impl Default for MatchPercent {
    fn default() -> Self {
        MatchPercent::Text(String::new())
    }
}

impl MatchPercent {
    /// Numeric value when one can be read out, `None` for prose.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MatchPercent::Number(n) => Some(*n),
            MatchPercent::Text(s) => {
                let t = s.trim().trim_end_matches('%').trim();
                t.parse::<f64>().ok()
            }
        }
    }
}

/// One complete per-job analysis, real or fallback.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct JobAnalysis {
    #[serde(default)]
    pub job_info: JobContext,
    #[serde(default)]
    pub skill_gap_analysis: SkillGapBreakdown,
    #[serde(default)]
    pub recommendations: Recommendations,
    #[serde(default)]
    pub job_match_assessment: MatchAssessment,
    #[serde(default)]
    pub career_advice: CareerAdvice,
    /// Set on fallback records; `None` means the model analysis parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn match_percent_reads_all_emitted_shapes() {
        assert_eq!(MatchPercent::Number(75.0).as_f64(), Some(75.0));
        assert_eq!(MatchPercent::Text("60".into()).as_f64(), Some(60.0));
        assert_eq!(MatchPercent::Text("85%".into()).as_f64(), Some(85.0));
        assert_eq!(MatchPercent::Text(" 42 % ".into()).as_f64(), Some(42.0));
        assert_eq!(MatchPercent::Text("Unable to calculate".into()).as_f64(), None);
    }

    #[test]
    fn partial_model_output_deserializes_with_defaults() {
        let v = json!({
            "skill_gap_analysis": { "matching_skills": ["rust"] },
            "job_match_assessment": { "overall_match_percentage": 80 }
        });
        let a: JobAnalysis = serde_json::from_value(v).unwrap();
        assert_eq!(a.skill_gap_analysis.matching_skills, vec!["rust"]);
        assert!(a.skill_gap_analysis.missing_skills.is_empty());
        assert_eq!(a.job_match_assessment.overall_match_percentage.as_f64(), Some(80.0));
        assert!(a.analysis_error.is_none());
    }

    #[test]
    fn untagged_percent_accepts_string_and_number() {
        let from_num: MatchAssessment =
            serde_json::from_value(json!({ "overall_match_percentage": 66.5 })).unwrap();
        let from_str: MatchAssessment =
            serde_json::from_value(json!({ "overall_match_percentage": "66%" })).unwrap();
        assert_eq!(from_num.overall_match_percentage.as_f64(), Some(66.5));
        assert_eq!(from_str.overall_match_percentage.as_f64(), Some(66.0));
    }
}
