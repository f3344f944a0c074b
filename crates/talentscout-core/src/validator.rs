//! Checks on collected candidate details and on answer quality.

use lazy_static::lazy_static;
use regex::Regex;

use crate::session::{CandidateField, CandidateInfo};

/// Default minimum word count for a substantive answer
pub const DEFAULT_MIN_ANSWER_WORDS: usize = 15;

/// Markers that disqualify an answer from counting as substantive
pub const NON_ANSWER_KEYWORDS: [&str; 6] = ["done", "thank", "finished", "complete", "skip", "n/a"];

lazy_static! {
    // Any TLD length is accepted, a@b.c included
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]+$").expect("valid email regex");
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[\d\s\-()]+$").expect("valid phone regex");
}

/// Heuristic for "the candidate actually explained something".
///
/// Substring matching is deliberate: a long answer that mentions "complete"
/// anywhere is rejected.
pub fn is_substantive_answer(text: &str, min_words: usize) -> bool {
    let lower = text.trim().to_lowercase();
    text.split_whitespace().count() >= min_words
        && !NON_ANSWER_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// A provided field whose value has the wrong shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidField {
    EmailFormat,
    PhoneFormat,
    ExperienceNotANumber,
    ExperienceUnrealistic,
}

impl InvalidField {
    pub fn field(&self) -> CandidateField {
        match self {
            InvalidField::EmailFormat => CandidateField::EmailAddress,
            InvalidField::PhoneFormat => CandidateField::PhoneNumber,
            InvalidField::ExperienceNotANumber | InvalidField::ExperienceUnrealistic => {
                CandidateField::YearsOfExperience
            }
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            InvalidField::EmailFormat | InvalidField::PhoneFormat => "invalid format",
            InvalidField::ExperienceNotANumber => "not a number",
            InvalidField::ExperienceUnrealistic => "unrealistic value",
        }
    }
}

impl std::fmt::Display for InvalidField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.field().label(), self.reason())
    }
}

/// Result of [`validate_candidate_info`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Required fields present; says nothing about `invalid`
    pub all_present: bool,
    pub missing: Vec<CandidateField>,
    pub invalid: Vec<InvalidField>,
}

impl ValidationReport {
    /// Both present and well-formed: the only state that ends info collection
    pub fn is_complete(&self) -> bool {
        self.all_present && self.missing.is_empty() && self.invalid.is_empty()
    }
}

pub fn validate_candidate_info(info: &CandidateInfo) -> ValidationReport {
    let missing: Vec<CandidateField> = CandidateField::REQUIRED
        .into_iter()
        .filter(|field| info.value(*field).is_none())
        .collect();

    let mut invalid = Vec::new();

    if let Some(email) = info.value(CandidateField::EmailAddress) {
        if !EMAIL_RE.is_match(email) {
            invalid.push(InvalidField::EmailFormat);
        }
    }

    if let Some(phone) = info.value(CandidateField::PhoneNumber) {
        if !PHONE_RE.is_match(phone) {
            invalid.push(InvalidField::PhoneFormat);
        }
    }

    if let Some(years) = info.value(CandidateField::YearsOfExperience) {
        match years.parse::<f64>() {
            Ok(exp) if (0.0..=50.0).contains(&exp) => {}
            Ok(_) => invalid.push(InvalidField::ExperienceUnrealistic),
            Err(_) => invalid.push(InvalidField::ExperienceNotANumber),
        }
    }

    ValidationReport {
        all_present: missing.is_empty(),
        missing,
        invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn info(pairs: &[(CandidateField, &str)]) -> CandidateInfo {
        let mut info = CandidateInfo::new();
        for (field, value) in pairs {
            info.set(*field, *value);
        }
        info
    }

    fn complete_info() -> CandidateInfo {
        info(&[
            (CandidateField::FullName, "John Doe"),
            (CandidateField::EmailAddress, "john@example.com"),
            (CandidateField::TechStack, "Python, SQL"),
        ])
    }

    #[test]
    fn test_substantive_answer() {
        assert!(is_substantive_answer(&words(20), DEFAULT_MIN_ANSWER_WORDS));
        assert!(!is_substantive_answer("I would use a cache here", DEFAULT_MIN_ANSWER_WORDS));
        assert!(!is_substantive_answer(
            &format!("{} done", words(19)),
            DEFAULT_MIN_ANSWER_WORDS
        ));
        assert!(!is_substantive_answer(
            &format!("{} Thanks", words(19)),
            DEFAULT_MIN_ANSWER_WORDS
        ));
    }

    #[test]
    fn test_substantive_threshold_is_inclusive() {
        assert!(is_substantive_answer(&words(15), 15));
        assert!(!is_substantive_answer(&words(14), 15));
        assert!(is_substantive_answer("short answer", 2));
    }

    #[test]
    fn test_complete_info_passes() {
        let report = validate_candidate_info(&complete_info());
        assert!(report.all_present);
        assert!(report.is_complete());
    }

    #[test]
    fn test_missing_tech_stack() {
        let report = validate_candidate_info(&info(&[
            (CandidateField::FullName, "John Doe"),
            (CandidateField::EmailAddress, "john@example.com"),
        ]));
        assert!(!report.all_present);
        assert_eq!(report.missing, vec![CandidateField::TechStack]);
    }

    #[test]
    fn test_sentinel_counts_as_missing() {
        let mut candidate = complete_info();
        candidate.set(CandidateField::TechStack, "n/a");
        candidate.set(CandidateField::FullName, "  ");
        let report = validate_candidate_info(&candidate);
        assert_eq!(
            report.missing,
            vec![CandidateField::FullName, CandidateField::TechStack]
        );
    }

    #[test]
    fn test_email_format() {
        let mut candidate = complete_info();
        candidate.set(CandidateField::EmailAddress, "a@b.c");
        assert!(validate_candidate_info(&candidate).invalid.is_empty());

        candidate.set(CandidateField::EmailAddress, "not-an-email");
        let report = validate_candidate_info(&candidate);
        assert!(report.all_present);
        assert_eq!(report.invalid, vec![InvalidField::EmailFormat]);
        assert_eq!(
            report.invalid[0].to_string(),
            "Email Address (invalid format)"
        );
        assert!(!report.is_complete());
    }

    #[test]
    fn test_phone_format() {
        let mut candidate = complete_info();
        candidate.set(CandidateField::PhoneNumber, "+1 (555) 123-4567");
        assert!(validate_candidate_info(&candidate).invalid.is_empty());

        candidate.set(CandidateField::PhoneNumber, "call me maybe");
        assert_eq!(
            validate_candidate_info(&candidate).invalid,
            vec![InvalidField::PhoneFormat]
        );
    }

    #[test]
    fn test_years_of_experience() {
        let mut candidate = complete_info();
        candidate.set(CandidateField::YearsOfExperience, "4.5");
        assert!(validate_candidate_info(&candidate).invalid.is_empty());

        candidate.set(CandidateField::YearsOfExperience, "60");
        let report = validate_candidate_info(&candidate);
        assert_eq!(report.invalid, vec![InvalidField::ExperienceUnrealistic]);
        assert_eq!(
            report.invalid[0].to_string(),
            "Years of Experience (unrealistic value)"
        );

        candidate.set(CandidateField::YearsOfExperience, "abc");
        let report = validate_candidate_info(&candidate);
        assert_eq!(report.invalid, vec![InvalidField::ExperienceNotANumber]);
        assert_eq!(
            report.invalid[0].to_string(),
            "Years of Experience (not a number)"
        );

        candidate.set(CandidateField::YearsOfExperience, "N/A");
        assert!(validate_candidate_info(&candidate).invalid.is_empty());
    }
}
