//! Pulling structure out of free-text model replies.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::session::{CandidateField, CandidateInfo};

/// Upper bound on generated questions kept from one reply
pub const MAX_QUESTIONS: usize = 5;

lazy_static! {
    static ref FENCED_BLOCK_RE: Regex =
        Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n(.*?)```").expect("valid fence regex");
    static ref NUMBERED_LINE_RE: Regex = Regex::new(r"^\d+\.").expect("valid numbering regex");
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("No fenced JSON block found in model reply")]
    NoStructuredBlock,

    #[error("Failed to parse candidate JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Candidate JSON is not an object")]
    NotAnObject,
}

/// Body of the first fenced code block in `reply`
pub fn extract_fenced_block(reply: &str) -> Option<&str> {
    FENCED_BLOCK_RE
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Parse the candidate record out of an extraction reply.
///
/// Only the seven known field labels are kept. Non-string values are
/// flattened (numbers printed, lists joined) since models are loose about
/// "Years of Experience" and "Tech Stack".
pub fn parse_candidate_info(reply: &str) -> Result<CandidateInfo, ParseError> {
    let block = extract_fenced_block(reply).ok_or(ParseError::NoStructuredBlock)?;
    debug!(block_len = block.len(), "Found structured block");

    let value: serde_json::Value = serde_json::from_str(block)?;
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let mut info = CandidateInfo::new();
    for (key, value) in object {
        let Some(field) = CandidateField::from_label(key) else {
            debug!(key = %key, "Ignoring unknown candidate field");
            continue;
        };
        if let Some(text) = flatten_value(value) {
            info.set(field, text);
        }
    }

    Ok(info)
}

fn flatten_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_value).collect();
            Some(parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}

/// Keep only lines that start with a `<number>.` marker, trimmed
pub fn parse_numbered_questions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| NUMBERED_LINE_RE.is_match(line))
        .take(MAX_QUESTIONS)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate_block() {
        let reply = r#"
Here is what I found:

```json
{
  "Full Name": "John Doe",
  "Email Address": "john@example.com",
  "Phone Number": "N/A",
  "Years of Experience": 4,
  "Tech Stack": ["Python", "SQL"],
  "Favourite Colour": "blue"
}
```
"#;
        let info = parse_candidate_info(reply).unwrap();
        assert_eq!(info.value(CandidateField::FullName), Some("John Doe"));
        assert_eq!(info.get(CandidateField::PhoneNumber), Some("N/A"));
        assert_eq!(info.value(CandidateField::YearsOfExperience), Some("4"));
        assert_eq!(info.value(CandidateField::TechStack), Some("Python, SQL"));
        assert_eq!(info.provided().len(), 4);
    }

    #[test]
    fn test_plain_fence_accepted() {
        let reply = "```\n{\"Full Name\": \"Ana\"}\n```";
        let info = parse_candidate_info(reply).unwrap();
        assert_eq!(info.first_name(), "Ana");
    }

    #[test]
    fn test_missing_block() {
        let result = parse_candidate_info("{\"Full Name\": \"Ana\"}");
        assert!(matches!(result, Err(ParseError::NoStructuredBlock)));
    }

    #[test]
    fn test_malformed_block() {
        let result = parse_candidate_info("```json\n{\"Full Name\": \n```");
        assert!(matches!(result, Err(ParseError::Json(_))));

        let result = parse_candidate_info("```json\n[1, 2]\n```");
        assert!(matches!(result, Err(ParseError::NotAnObject)));
    }

    #[test]
    fn test_numbered_questions() {
        let reply = "Here are your questions:\n\n1. Design a rate limiter.\n   2. Debug a memory leak in a Flask app.\n- not numbered\n3. Optimize a slow SQL join.\n\nGood luck!";
        let questions = parse_numbered_questions(reply);
        assert_eq!(
            questions,
            vec![
                "1. Design a rate limiter.",
                "2. Debug a memory leak in a Flask app.",
                "3. Optimize a slow SQL join.",
            ]
        );
    }

    #[test]
    fn test_numbered_questions_capped() {
        let reply = (1..=8)
            .map(|i| format!("{}. Question {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_numbered_questions(&reply).len(), MAX_QUESTIONS);
        assert!(parse_numbered_questions("no list here").is_empty());
    }
}
