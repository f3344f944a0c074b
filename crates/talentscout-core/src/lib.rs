//! # talentscout-core
//!
//! The screening conversation: session model, phase routing, validation of
//! candidate details, prompt templates and parsing of model replies.
//!
//! A [`Controller`] maps one candidate utterance plus the current
//! [`Session`] to one assistant reply:
//!
//! 1. **Navigation**: "next", "skip" and "back" move between questions
//! 2. **Completion**: "done", "thanks" and friends request the assessment
//! 3. **Technical Q&A**: answers are recorded, short ones get a follow-up
//! 4. **Information collection**: details are extracted and validated
//!
//! The model is reached through [`talentscout_agent::ChatModel`], so the
//! controller can be driven by any backend or by a scripted stub.

mod controller;
mod language;
mod parse;
mod prompts;
mod session;
pub mod transcript;
mod validator;

pub use controller::{Controller, COMPLETION_KEYWORDS};
pub use language::Language;
pub use parse::{
    extract_fenced_block, parse_candidate_info, parse_numbered_questions, ParseError,
    MAX_QUESTIONS,
};
pub use prompts::{format_answers, ScreeningPrompts};
pub use session::{
    is_set, AnswerRecord, CandidateField, CandidateInfo, Interview, Message, Phase, Role,
    Session, SessionSnapshot, NOT_AVAILABLE, WELCOME_MESSAGE,
};
pub use validator::{
    is_substantive_answer, validate_candidate_info, InvalidField, ValidationReport,
    DEFAULT_MIN_ANSWER_WORDS, NON_ANSWER_KEYWORDS,
};
