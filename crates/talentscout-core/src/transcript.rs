//! Markdown rendering of a screening session for export.

use std::fmt::Write;

use chrono::Local;

use crate::session::{Role, Session};

/// Render candidate details, questions with their answers, and the full
/// chat log as a Markdown document
pub fn to_markdown(session: &Session) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# TalentScout Screening Transcript\n");
    let _ = writeln!(
        out,
        "_Exported {}. Status: {}. Language: {}._\n",
        Local::now().format("%Y-%m-%d %H:%M"),
        session.phase.label(),
        session.language
    );

    let _ = writeln!(out, "## Candidate\n");
    let provided = session.candidate.provided();
    if provided.is_empty() {
        let _ = writeln!(out, "_No details collected yet._\n");
    } else {
        for (field, value) in provided {
            let _ = writeln!(out, "- **{}**: {}", field, value);
        }
        out.push('\n');
    }

    if let Some(interview) = session.phase.interview() {
        let _ = writeln!(out, "## Technical Questions\n");
        for (index, question) in interview.questions.iter().enumerate() {
            let _ = writeln!(out, "### {}\n", question);
            match interview.answers.get(&index) {
                Some(record) if !record.answers.is_empty() => {
                    for answer in &record.answers {
                        let _ = writeln!(out, "> {}\n", answer);
                    }
                    if !record.complete {
                        let _ = writeln!(out, "_Awaiting a more detailed answer._\n");
                    }
                }
                _ => {
                    let _ = writeln!(out, "_Not answered._\n");
                }
            }
        }
    }

    let _ = writeln!(out, "## Conversation\n");
    for message in &session.messages {
        let speaker = match message.role {
            Role::User => "Candidate",
            Role::Assistant => "TalentScout",
        };
        let _ = writeln!(out, "**{}:** {}\n", speaker, message.content);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CandidateField, Interview, Phase};
    use crate::Language;

    #[test]
    fn test_fresh_session_transcript() {
        let session = Session::new(Language::English);
        let md = to_markdown(&session);
        assert!(md.starts_with("# TalentScout Screening Transcript"));
        assert!(md.contains("Status: collecting_info"));
        assert!(md.contains("_No details collected yet._"));
        assert!(!md.contains("## Technical Questions"));
        assert!(md.contains("**TalentScout:** 👋 Hello!"));
    }

    #[test]
    fn test_interview_transcript() {
        let mut session = Session::new(Language::Hindi);
        session.candidate.set(CandidateField::FullName, "Asha Rao");
        session.candidate.set(CandidateField::PhoneNumber, "N/A");

        let mut interview = Interview::new(vec!["1. Design a queue".into(), "2. Tune GC".into()]);
        interview.record_answer("Use a ring buffer");
        session.phase = Phase::Completed(interview);
        session.push_user("Use a ring buffer");

        let md = to_markdown(&session);
        assert!(md.contains("Language: Hindi"));
        assert!(md.contains("- **Full Name**: Asha Rao"));
        assert!(!md.contains("**Phone Number**: "));
        assert!(md.contains("### 1. Design a queue\n\n> Use a ring buffer"));
        assert!(md.contains("_Awaiting a more detailed answer._"));
        assert!(md.contains("### 2. Tune GC\n\n_Not answered._"));
        assert!(md.contains("**Candidate:** Use a ring buffer"));
    }
}
