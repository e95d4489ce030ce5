//! Aggregation of per-job analyses into one overall report.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::errors::AnalysisError;
use crate::records::JobAnalysis;

#[derive(Clone, Debug, Serialize)]
pub struct ReportSummary {
    pub total_jobs_analyzed: usize,
    /// Formatted like `"62.5%"`, averaged over parseable percentages only.
    pub average_match_percentage: String,
    pub most_common_missing_skills: Vec<String>,
    pub strongest_skills: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReportRecommendations {
    pub top_skills_to_develop: Vec<String>,
    /// `"good"`, `"needs_improvement"` or `"significant_gaps"`.
    pub career_readiness: String,
    pub next_steps: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SkillGapReport {
    pub summary: ReportSummary,
    pub recommendations: ReportRecommendations,
    pub job_analyses: Vec<JobAnalysis>,
}

/// Builds the overall report.
///
/// Skill frequencies keep first-seen order among ties. Unparseable match
/// percentages (fallback records say "Unable to calculate") are excluded
/// from the average; an all-unparseable batch averages to 0.
///
/// # Errors
/// [`AnalysisError::EmptyReport`] for an empty input slice.
pub fn generate_report(analyses: &[JobAnalysis]) -> Result<SkillGapReport, AnalysisError> {
    if analyses.is_empty() {
        return Err(AnalysisError::EmptyReport);
    }

    let missing = frequency_ranked(
        analyses
            .iter()
            .flat_map(|a| a.skill_gap_analysis.missing_skills.iter()),
    );
    let matching = frequency_ranked(
        analyses
            .iter()
            .flat_map(|a| a.skill_gap_analysis.matching_skills.iter()),
    );

    let percentages: Vec<f64> = analyses
        .iter()
        .filter_map(|a| a.job_match_assessment.overall_match_percentage.as_f64())
        .collect();
    let avg = if percentages.is_empty() {
        0.0
    } else {
        percentages.iter().sum::<f64>() / percentages.len() as f64
    };

    let readiness = if avg >= 70.0 {
        "good"
    } else if avg >= 50.0 {
        "needs_improvement"
    } else {
        "significant_gaps"
    };

    let top_missing: Vec<String> = missing.iter().take(10).map(|(s, _)| s.clone()).collect();
    let top_matching: Vec<String> = matching.iter().take(10).map(|(s, _)| s.clone()).collect();
    let to_develop: Vec<String> = top_missing.iter().take(5).cloned().collect();

    info!(
        jobs = analyses.len(),
        avg_match = avg,
        readiness,
        "overall report generated"
    );

    Ok(SkillGapReport {
        summary: ReportSummary {
            total_jobs_analyzed: analyses.len(),
            average_match_percentage: format!("{avg:.1}%"),
            most_common_missing_skills: top_missing,
            strongest_skills: top_matching,
        },
        recommendations: ReportRecommendations {
            top_skills_to_develop: to_develop.clone(),
            career_readiness: readiness.into(),
            next_steps: next_steps(&to_develop, avg),
        },
        job_analyses: analyses.to_vec(),
    })
}

/// Counts occurrences, ranked by count descending with first-seen tie order.
fn frequency_ranked<'a>(items: impl Iterator<Item = &'a String>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for item in items {
        let entry = counts.entry(item.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(item.as_str());
        }
        *entry += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|s| (s.to_string(), counts[s]))
        .collect();
    // stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn next_steps(top_missing: &[String], avg: f64) -> Vec<String> {
    let mut steps = Vec::with_capacity(6);

    if avg < 50.0 {
        steps.push("Focus on building foundational skills before applying to these positions".into());
    } else if avg < 70.0 {
        steps.push("Develop 2-3 key missing skills to improve job readiness".into());
    } else {
        steps.push("You're well-positioned for these roles - consider applying!".into());
    }

    if !top_missing.is_empty() {
        let areas: Vec<&str> = top_missing.iter().take(3).map(String::as_str).collect();
        steps.push(format!("Priority learning areas: {}", areas.join(", ")));
    }

    steps.extend([
        "Build portfolio projects demonstrating new skills".into(),
        "Update resume to highlight relevant experience".into(),
        "Practice behavioral interviews using STAR method".into(),
        "Network with professionals in your target companies".into(),
    ]);

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{JobAnalysis, MatchPercent};

    fn analysis(pct: MatchPercent, missing: &[&str], matching: &[&str]) -> JobAnalysis {
        let mut a = JobAnalysis::default();
        a.job_match_assessment.overall_match_percentage = pct;
        a.skill_gap_analysis.missing_skills = missing.iter().map(|s| s.to_string()).collect();
        a.skill_gap_analysis.matching_skills = matching.iter().map(|s| s.to_string()).collect();
        a
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            generate_report(&[]),
            Err(AnalysisError::EmptyReport)
        ));
    }

    #[test]
    fn averages_and_tier_over_mixed_percentages() {
        let analyses = vec![
            analysis(MatchPercent::Number(80.0), &["k8s"], &["python"]),
            analysis(MatchPercent::Text("60%".into()), &["k8s", "go"], &["python"]),
            analysis(MatchPercent::Number(40.0), &["go"], &["sql"]),
        ];
        let report = generate_report(&analyses).unwrap();
        assert_eq!(report.summary.average_match_percentage, "60.0%");
        assert_eq!(report.recommendations.career_readiness, "needs_improvement");
        assert_eq!(report.summary.total_jobs_analyzed, 3);
    }

    #[test]
    fn unparseable_percentages_are_excluded() {
        let analyses = vec![
            analysis(MatchPercent::Number(90.0), &[], &[]),
            analysis(MatchPercent::Text("Unable to calculate".into()), &[], &[]),
        ];
        let report = generate_report(&analyses).unwrap();
        assert_eq!(report.summary.average_match_percentage, "90.0%");
        assert_eq!(report.recommendations.career_readiness, "good");
    }

    #[test]
    fn all_unparseable_averages_to_zero() {
        let analyses = vec![analysis(MatchPercent::Text("n/a".into()), &[], &[])];
        let report = generate_report(&analyses).unwrap();
        assert_eq!(report.summary.average_match_percentage, "0.0%");
        assert_eq!(report.recommendations.career_readiness, "significant_gaps");
    }

    #[test]
    fn tier_bounds_are_inclusive() {
        let at_70 = generate_report(&[analysis(MatchPercent::Number(70.0), &[], &[])]).unwrap();
        assert_eq!(at_70.recommendations.career_readiness, "good");

        let at_50 = generate_report(&[analysis(MatchPercent::Number(50.0), &[], &[])]).unwrap();
        assert_eq!(at_50.recommendations.career_readiness, "needs_improvement");
    }

    #[test]
    fn skill_frequencies_rank_by_count_then_first_seen() {
        let analyses = vec![
            analysis(MatchPercent::Number(50.0), &["docker", "k8s"], &[]),
            analysis(MatchPercent::Number(50.0), &["k8s", "terraform"], &[]),
        ];
        let report = generate_report(&analyses).unwrap();
        assert_eq!(
            report.summary.most_common_missing_skills,
            vec!["k8s", "docker", "terraform"]
        );
        assert_eq!(report.recommendations.top_skills_to_develop[0], "k8s");
    }

    #[test]
    fn next_steps_lead_with_the_tier_and_name_priorities() {
        let analyses = vec![analysis(
            MatchPercent::Number(55.0),
            &["rust", "go", "k8s", "terraform"],
            &[],
        )];
        let report = generate_report(&analyses).unwrap();
        let steps = &report.recommendations.next_steps;
        assert!(steps[0].contains("Develop 2-3 key missing skills"));
        assert_eq!(steps[1], "Priority learning areas: rust, go, k8s");
        assert_eq!(steps.len(), 6);
    }
}
