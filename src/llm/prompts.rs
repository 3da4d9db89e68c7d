//! The single evaluation prompt sent for every resume

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Field names of the object the model is asked to return.
pub const FIELD_MATCH: &str = "JD Match";
pub const FIELD_MISSING_KEYWORDS: &str = "MissingKeywords";
pub const FIELD_PROFILE_SUMMARY: &str = "Profile Summary";
pub const FIELD_SUGGESTIONS: &str = "Suggestions";

const EVALUATION_TEMPLATE: &str = r#"
Hey Act Like a skilled or very experienced ATS (Application Tracking System)
with a deep understanding of the tech field, software engineering, data science,
data analysis, and big data engineering. Your task is to evaluate the resumes based
on the given job description. You must consider the job market is very competitive
and you should provide the best assistance for improving the resumes. Assign the
percentage matching based on JD and the missing keywords with high accuracy.
resume:{resume}
description:{job}

I want the response as per below structure
{"JD Match": "%", "MissingKeywords": [], "Profile Summary": "", "Suggestions": ""}

Be strict while scoring: a candidate must cover most of the required skills, experience, and technologies to get a higher match. Score each resume uniquely and realistically based on content.
"#;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(resume|job)\}").expect("Invalid placeholder regex"))
}

/// Render the evaluation prompt with both texts embedded verbatim.
///
/// Substitution is a single pass over the template, so placeholder-looking
/// text inside either document is left alone.
pub fn build_prompt(resume_text: &str, job_description: &str) -> String {
    placeholder_regex()
        .replace_all(EVALUATION_TEMPLATE, |caps: &Captures| match &caps[1] {
            "resume" => resume_text.to_string(),
            _ => job_description.to_string(),
        })
        .into_owned()
}
