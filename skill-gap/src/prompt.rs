//! Prompt construction for the analysis calls.

use job_match_store::JobMatch;

use crate::records::ResumeProfile;

fn or_unspecified(s: &str) -> &str {
    if s.trim().is_empty() { "Not specified" } else { s }
}

/// Builds the per-job analysis prompt demanding a JSON-only answer.
pub fn analysis_prompt(resume: &ResumeProfile, job: &JobMatch) -> String {
    format!(
        r#"You are an expert career advisor and technical recruiter. Analyze the following resume and job requirements to identify skill gaps and provide recommendations.

RESUME INFORMATION:
Skills: {skills}
Experience: {experience}
Education: {education}
Projects: {projects}

JOB REQUIREMENTS:
Title: {title}
Company: {company}
Description: {description}
Location: {location}

ANALYSIS INSTRUCTIONS:
1. Compare the resume skills with skills mentioned or implied in the job description
2. Look for programming languages, frameworks, tools, methodologies in the job description
3. Identify both exact matches and closely related skills (e.g. NoSQL databases -> mongodb, cassandra)
4. Consider years of experience requirements
5. Look for soft skills and technical competencies

Please provide ONLY a valid JSON response in exactly this format:
{{
    "skill_gap_analysis": {{
        "matching_skills": ["skills that appear in both resume and job requirements"],
        "missing_skills": ["skills clearly mentioned in job but not in resume"],
        "skill_level_gaps": ["skills where experience level differs"],
        "transferable_skills": ["resume skills that could apply to this job"]
    }},
    "recommendations": {{
        "priority_skills_to_learn": ["top 3-5 most critical missing skills"],
        "learning_resources": ["specific learning suggestions"],
        "project_suggestions": ["project ideas to build missing skills"],
        "timeline_estimate": "realistic timeframe like '2-4 months'"
    }},
    "job_match_assessment": {{
        "overall_match_percentage": "numeric percentage like 75",
        "strengths": ["candidate's advantages for this role"],
        "concerns": ["potential weaknesses or gaps"],
        "interview_preparation_tips": ["specific interview advice"]
    }}
}}

Return only valid JSON without any markdown, explanations, or code blocks."#,
        skills = resume.skills.join(", "),
        experience = or_unspecified(&resume.experience),
        education = or_unspecified(&resume.education),
        projects = or_unspecified(&resume.projects),
        title = or_unspecified(&job.title),
        company = or_unspecified(&job.company),
        description = if job.description.trim().is_empty() {
            "No description available"
        } else {
            job.description.as_str()
        },
        location = or_unspecified(&job.location),
    )
}

/// Prompt asking for four job-search keywords as a bare JSON array.
pub fn keyword_prompt(resume: &ResumeProfile) -> String {
    format!(
        r#"Based on this resume information, suggest 4 specific job titles/keywords that would be most relevant for job searching.

RESUME SKILLS: {skills}
EXPERIENCE: {experience}
EDUCATION: {education}
PROJECTS: {projects}

Return ONLY a JSON array of 4 job titles/keywords, nothing else:
["Job Title 1", "Job Title 2", "Job Title 3", "Job Title 4"]"#,
        skills = resume.skills.join(", "),
        experience = clamp(or_unspecified(&resume.experience), 500),
        education = clamp(or_unspecified(&resume.education), 300),
        projects = clamp(or_unspecified(&resume.projects), 400),
    )
}

/// Char-boundary-safe prefix.
fn clamp(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobMatch {
        JobMatch {
            job_id: "j1".into(),
            score: 0.8,
            title: "Platform Engineer".into(),
            company: "Initech".into(),
            location: "Remote".into(),
            apply_link: String::new(),
            description: "Kubernetes and Go experience required".into(),
        }
    }

    #[test]
    fn analysis_prompt_carries_resume_and_job() {
        let resume = ResumeProfile {
            skills: vec!["rust".into(), "sql".into()],
            ..Default::default()
        };
        let p = analysis_prompt(&resume, &job());
        assert!(p.contains("rust, sql"));
        assert!(p.contains("Platform Engineer"));
        assert!(p.contains("Experience: Not specified"));
        assert!(p.contains("ONLY a valid JSON response"));
    }

    #[test]
    fn keyword_prompt_clamps_long_sections() {
        let resume = ResumeProfile {
            experience: "x".repeat(2000),
            ..Default::default()
        };
        let p = keyword_prompt(&resume);
        assert!(p.len() < 1500);
    }
}
