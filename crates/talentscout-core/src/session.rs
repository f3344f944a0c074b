//! Screening session state.
//!
//! In memory the conversation phase is an explicit [`Phase`]; on disk the
//! session is a flat [`SessionSnapshot`] record of flags, derived from the
//! phase on save and folded back into it on load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Language;

/// Sentinel the model uses for a field it could not find
pub const NOT_AVAILABLE: &str = "N/A";

/// Hardcoded greeting shown on a fresh session. Never replayed to the model.
pub const WELCOME_MESSAGE: &str = "👋 Hello! I'm **TalentScout**, your AI hiring assistant. To begin your quick technical screening, please provide the following details:

- **Full Name**
- **Email**
- **Phone Number**
- **Years of Tech Experience**
- **Preferred Role(s)**
- **Current Location**
- **Your Tech Stack**

Once I have this, I'll generate a few technical questions for you. 🚀";

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the visible chat log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.role == Role::Assistant && self.content == WELCOME_MESSAGE
    }
}

/// The candidate details collected during the first phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateField {
    FullName,
    EmailAddress,
    PhoneNumber,
    YearsOfExperience,
    DesiredPositions,
    CurrentLocation,
    TechStack,
}

impl CandidateField {
    pub const ALL: [CandidateField; 7] = [
        CandidateField::FullName,
        CandidateField::EmailAddress,
        CandidateField::PhoneNumber,
        CandidateField::YearsOfExperience,
        CandidateField::DesiredPositions,
        CandidateField::CurrentLocation,
        CandidateField::TechStack,
    ];

    pub const REQUIRED: [CandidateField; 3] = [
        CandidateField::FullName,
        CandidateField::EmailAddress,
        CandidateField::TechStack,
    ];

    /// Key used in extraction replies and in the persisted record
    pub fn label(&self) -> &'static str {
        match self {
            CandidateField::FullName => "Full Name",
            CandidateField::EmailAddress => "Email Address",
            CandidateField::PhoneNumber => "Phone Number",
            CandidateField::YearsOfExperience => "Years of Experience",
            CandidateField::DesiredPositions => "Desired Position(s)",
            CandidateField::CurrentLocation => "Current Location",
            CandidateField::TechStack => "Tech Stack",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        CandidateField::ALL
            .into_iter()
            .find(|field| field.label() == label.trim())
    }
}

impl std::fmt::Display for CandidateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a raw field value counts as provided
pub fn is_set(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case(NOT_AVAILABLE)
}

/// Field label -> free-text value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateInfo {
    fields: BTreeMap<String, String>,
}

impl CandidateInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, sentinel included
    pub fn get(&self, field: CandidateField) -> Option<&str> {
        self.fields.get(field.label()).map(String::as_str)
    }

    /// Stored value only when it is actually provided
    pub fn value(&self, field: CandidateField) -> Option<&str> {
        self.get(field).map(str::trim).filter(|v| is_set(v))
    }

    pub fn set(&mut self, field: CandidateField, value: impl Into<String>) {
        self.fields.insert(field.label().to_string(), value.into());
    }

    /// Merge a newer extraction over this one; every key it carries wins,
    /// "N/A" included.
    pub fn merge(&mut self, newer: CandidateInfo) {
        self.fields.extend(newer.fields);
    }

    /// Provided fields in display order
    pub fn provided(&self) -> Vec<(CandidateField, &str)> {
        CandidateField::ALL
            .into_iter()
            .filter_map(|field| self.value(field).map(|v| (field, v)))
            .collect()
    }

    /// First word of the full name, or "Candidate"
    pub fn first_name(&self) -> String {
        self.value(CandidateField::FullName)
            .and_then(|name| name.split_whitespace().next())
            .unwrap_or("Candidate")
            .to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Every answer given to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    #[serde(default)]
    pub answers: Vec<String>,
    /// Set once a substantive answer arrives. Informational only.
    #[serde(default)]
    pub complete: bool,
}

/// The technical Q&A part of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interview {
    pub questions: Vec<String>,
    /// Cursor into `questions`; past the end means "all done"
    pub current: usize,
    /// Keyed by question index, always `< questions.len()`
    pub answers: BTreeMap<usize, AnswerRecord>,
    pub awaiting_follow_up: bool,
}

impl Interview {
    pub fn new(questions: Vec<String>) -> Self {
        Self {
            questions,
            ..Default::default()
        }
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.current).map(String::as_str)
    }

    pub fn advance(&mut self) {
        self.current += 1;
        self.awaiting_follow_up = false;
    }

    pub fn back(&mut self) {
        self.current = self.current.saturating_sub(1);
        self.awaiting_follow_up = false;
    }

    /// Append an answer to the current question, creating its record lazily.
    /// Returns None when the cursor is past the last question.
    pub fn record_answer(&mut self, answer: &str) -> Option<&mut AnswerRecord> {
        let question = self.current_question()?.to_string();
        let record = self
            .answers
            .entry(self.current)
            .or_insert_with(|| AnswerRecord {
                question,
                answers: Vec::new(),
                complete: false,
            });
        record.answers.push(answer.to_string());
        Some(record)
    }
}

/// Where the conversation stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// Gathering candidate details
    #[default]
    CollectingInfo,
    /// Questions generated, answers being collected
    AskingQuestions(Interview),
    /// Assessment delivered
    Completed(Interview),
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::CollectingInfo => "collecting_info",
            Phase::AskingQuestions(_) => "asking_questions",
            Phase::Completed(_) => "completed",
        }
    }

    pub fn interview(&self) -> Option<&Interview> {
        match self {
            Phase::CollectingInfo => None,
            Phase::AskingQuestions(interview) | Phase::Completed(interview) => Some(interview),
        }
    }
}

/// The root aggregate of one screening conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SessionSnapshot", into = "SessionSnapshot")]
pub struct Session {
    pub messages: Vec<Message>,
    pub candidate: CandidateInfo,
    pub phase: Phase,
    pub language: Language,
    /// Set once the welcome message asking for details has been shown
    pub info_requested: bool,
}

impl Session {
    /// A fresh session opening with the welcome message
    pub fn new(language: Language) -> Self {
        Self {
            messages: vec![Message::assistant(WELCOME_MESSAGE)],
            language,
            info_requested: true,
            ..Default::default()
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn info_collected(&self) -> bool {
        !matches!(self.phase, Phase::CollectingInfo)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Completed(_))
    }
}

/// The persisted form of a [`Session`].
///
/// Field names are part of the on-disk format. Missing keys default, unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub candidate_info: CandidateInfo,
    pub info_requested: bool,
    pub info_collected: bool,
    pub tech_questions_asked: bool,
    pub generated_questions: Vec<String>,
    pub conversation_ended: bool,
    pub answer_log: BTreeMap<usize, AnswerRecord>,
    pub current_question_index: usize,
    pub awaiting_follow_up: bool,
    pub selected_language: Language,
}

impl From<Session> for SessionSnapshot {
    fn from(session: Session) -> Self {
        let (info_collected, conversation_ended) = match session.phase {
            Phase::CollectingInfo => (false, false),
            Phase::AskingQuestions(_) => (true, false),
            Phase::Completed(_) => (true, true),
        };

        let interview = match session.phase {
            Phase::CollectingInfo => Interview::default(),
            Phase::AskingQuestions(interview) | Phase::Completed(interview) => interview,
        };

        Self {
            messages: session.messages,
            candidate_info: session.candidate,
            info_requested: session.info_requested,
            info_collected,
            tech_questions_asked: info_collected,
            generated_questions: interview.questions,
            conversation_ended,
            answer_log: interview.answers,
            current_question_index: interview.current,
            awaiting_follow_up: interview.awaiting_follow_up,
            selected_language: session.language,
        }
    }
}

impl From<SessionSnapshot> for Session {
    fn from(snapshot: SessionSnapshot) -> Self {
        // Questions are what make the Q&A phase reachable; flags without
        // them fall back to collecting info again.
        let has_questions = snapshot.tech_questions_asked && !snapshot.generated_questions.is_empty();

        let phase = if has_questions {
            let question_count = snapshot.generated_questions.len();
            let interview = Interview {
                questions: snapshot.generated_questions,
                current: snapshot.current_question_index,
                answers: snapshot
                    .answer_log
                    .into_iter()
                    .filter(|(index, _)| *index < question_count)
                    .collect(),
                awaiting_follow_up: snapshot.awaiting_follow_up,
            };
            if snapshot.conversation_ended {
                Phase::Completed(interview)
            } else {
                Phase::AskingQuestions(interview)
            }
        } else {
            Phase::CollectingInfo
        };

        Self {
            messages: snapshot.messages,
            candidate: snapshot.candidate_info,
            phase,
            language: snapshot.selected_language,
            info_requested: snapshot.info_requested,
        }
    }
}
