use std::sync::Arc;

use tracing::{debug, info, warn};

use talentscout_agent::{ChatModel, ChatSession};
use talentscout_logging::{LogEvent, Logger};

use crate::parse::{parse_candidate_info, parse_numbered_questions};
use crate::prompts::ScreeningPrompts;
use crate::session::{CandidateField, Interview, Phase, Session, NOT_AVAILABLE};
use crate::validator::{
    is_substantive_answer, validate_candidate_info, ValidationReport, DEFAULT_MIN_ANSWER_WORDS,
};
use crate::Language;

/// Phrases that signal the candidate wants to wrap up
pub const COMPLETION_KEYWORDS: [&str; 7] = [
    "thank",
    "done",
    "finished",
    "that's all",
    "no more",
    "complete",
    "bye",
];

const EXAMPLE_FORMAT: &str =
    "Full Name: John Doe, Email: john@example.com, Tech Stack: Python, SQL";
const FOLLOW_UP_PREFIX: &str = "To better understand: ";
const FOLLOW_UP_FALLBACK: &str = "Could you elaborate on your last point?";
const QUESTIONS_FAILED: &str = "Error generating questions. Please try again.";
const NO_ANSWERS_YET: &str =
    "Please answer at least one question completely before saying 'done'.";
const ALL_ANSWERED: &str = "You've answered all questions. Say 'done' for your assessment.";
const PAST_LAST_QUESTION: &str =
    "You've answered all questions or navigated past them. Say 'done' for your assessment.";
const NAVIGATED_PAST_END: &str = "You've completed all questions. Say 'done' for your assessment.";
const NAVIGATION_TOO_EARLY: &str =
    "Technical questions start once your details are collected. Please provide the requested information first.";
const SCREENING_CONCLUDED: &str =
    "This screening has concluded. Start a new session to screen another candidate.";
const FALLBACK: &str =
    "I'm not sure how to proceed. Please provide the requested information or answer the current question.";

/// Question navigation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Navigation {
    Next,
    Skip,
    Back,
}

impl Navigation {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "next" => Some(Navigation::Next),
            "skip" => Some(Navigation::Skip),
            "back" => Some(Navigation::Back),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Navigation::Next => "next",
            Navigation::Skip => "skip",
            Navigation::Back => "back",
        }
    }
}

fn is_completion_intent(input: &str) -> bool {
    let lower = input.to_lowercase();
    COMPLETION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn tech_stack(session: &Session) -> String {
    session
        .candidate
        .value(CandidateField::TechStack)
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// Itemized "what is still wrong" reply for an incomplete candidate record
fn info_feedback(report: &ValidationReport) -> String {
    let mut lines = vec!["Please provide:".to_string()];
    if !report.missing.is_empty() {
        let missing: Vec<&str> = report.missing.iter().map(|f| f.label()).collect();
        lines.push(format!("Missing: {}", missing.join(", ")));
    }
    if !report.invalid.is_empty() {
        let invalid: Vec<String> = report.invalid.iter().map(|f| f.to_string()).collect();
        lines.push(format!("Invalid: {}", invalid.join(", ")));
    }
    lines.push(format!("\nExample format: {}", EXAMPLE_FORMAT));
    lines.join("\n")
}

/// Drives one screening conversation.
///
/// Owns the model chat; the [`Session`] is passed in on every call so the
/// caller stays in charge of persisting it.
pub struct Controller {
    chat: ChatSession,
    logger: Arc<Logger>,
    min_answer_words: usize,
}

impl Controller {
    /// Seed a chat for `session`, replaying its visible log
    pub fn new(model: Arc<dyn ChatModel>, session: &Session, logger: Arc<Logger>) -> Self {
        let history = ScreeningPrompts::history_for(session.language, &session.messages);
        Self {
            chat: ChatSession::new(model, history),
            logger,
            min_answer_words: DEFAULT_MIN_ANSWER_WORDS,
        }
    }

    pub fn with_min_answer_words(mut self, min_answer_words: usize) -> Self {
        self.min_answer_words = min_answer_words;
        self
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Handle one user utterance: record it, route it, record the reply.
    ///
    /// Model failures never escape; they come back as assistant text.
    pub async fn respond(&mut self, session: &mut Session, input: &str) -> String {
        self.logger.log(&LogEvent::TurnReceived {
            phase: session.phase.label().to_string(),
            input_len: input.len(),
        });

        session.push_user(input);
        let reply = self.route(session, input).await;
        session.push_assistant(reply.clone());
        reply
    }

    async fn route(&mut self, session: &mut Session, input: &str) -> String {
        if session.is_ended() {
            return SCREENING_CONCLUDED.to_string();
        }

        if input.trim().is_empty() {
            return FALLBACK.to_string();
        }

        if let Some(nav) = Navigation::parse(input) {
            return self.navigate(session, nav);
        }

        if is_completion_intent(input) {
            return self.complete(session).await;
        }

        match session.phase {
            Phase::AskingQuestions(_) => self.answer_question(session, input).await,
            Phase::CollectingInfo => self.collect_info(session, input).await,
            Phase::Completed(_) => FALLBACK.to_string(),
        }
    }

    fn navigate(&self, session: &mut Session, nav: Navigation) -> String {
        let Phase::AskingQuestions(interview) = &mut session.phase else {
            debug!(command = nav.as_str(), "Navigation before questions exist");
            return NAVIGATION_TOO_EARLY.to_string();
        };

        match nav {
            Navigation::Back => interview.back(),
            Navigation::Next | Navigation::Skip => interview.advance(),
        }

        self.logger.log(&LogEvent::NavigationApplied {
            command: nav.as_str().to_string(),
            question_index: interview.current,
        });

        interview
            .current_question()
            .map(String::from)
            .unwrap_or_else(|| NAVIGATED_PAST_END.to_string())
    }

    async fn complete(&mut self, session: &mut Session) -> String {
        let language = session.language;
        let stack = tech_stack(session);
        let first_name = session.candidate.first_name();

        let interview = match &session.phase {
            Phase::AskingQuestions(interview) if !interview.answers.is_empty() => interview,
            _ => return NO_ANSWERS_YET.to_string(),
        };

        let min_words = self.min_answer_words;
        let incomplete = interview.answers.iter().find(|(_, record)| {
            !record
                .answers
                .iter()
                .any(|answer| is_substantive_answer(answer, min_words))
        });
        if let Some((index, _)) = incomplete {
            return format!(
                "Question {} needs a more detailed answer before completing.",
                index + 1
            );
        }

        let prompt = ScreeningPrompts::build_assessment_prompt(&stack, &interview.answers, language);
        let questions_answered = interview.answers.len();

        match self.chat.send(&prompt).await {
            Ok(assessment) => {
                if let Phase::AskingQuestions(interview) = std::mem::take(&mut session.phase) {
                    session.phase = Phase::Completed(interview);
                }
                info!(questions_answered, "Screening completed");
                self.logger
                    .log(&LogEvent::AssessmentGenerated { questions_answered });
                format!(
                    "🎯 Technical Assessment for {}:\n{}\n\nThank you for your time! We'll be in touch within 5-7 business days.",
                    first_name, assessment
                )
            }
            Err(e) => {
                warn!(error = %e, "Assessment generation failed");
                self.log_error("assessment", &e.to_string());
                format!("Error generating assessment: {}", e)
            }
        }
    }

    async fn answer_question(&mut self, session: &mut Session, input: &str) -> String {
        let language = session.language;
        let stack = tech_stack(session);
        let min_words = self.min_answer_words;

        let Phase::AskingQuestions(interview) = &mut session.phase else {
            return FALLBACK.to_string();
        };

        let index = interview.current;
        let Some(record) = interview.record_answer(input) else {
            return PAST_LAST_QUESTION.to_string();
        };

        let substantive = is_substantive_answer(input, min_words);
        if substantive {
            record.complete = true;
        }
        let question = record.question.clone();

        self.logger.log(&LogEvent::AnswerRecorded {
            question_index: index,
            substantive,
            attempts: record.answers.len(),
        });

        if substantive {
            interview.advance();
            return interview
                .current_question()
                .map(String::from)
                .unwrap_or_else(|| ALL_ANSWERED.to_string());
        }

        interview.awaiting_follow_up = true;

        let prompt = ScreeningPrompts::build_follow_up_prompt(&question, input, &stack, language);
        let follow_up = match self.chat.send(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Follow-up generation failed");
                self.log_error("follow_up", &e.to_string());
                FOLLOW_UP_FALLBACK.to_string()
            }
        };

        self.logger.log(&LogEvent::FollowUpIssued {
            question_index: index,
        });
        format!("{}{}", FOLLOW_UP_PREFIX, follow_up)
    }

    async fn collect_info(&mut self, session: &mut Session, input: &str) -> String {
        let prompt = ScreeningPrompts::build_extraction_prompt(input, session.language);

        let reply = match self.chat.send(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Extraction request failed");
                self.log_error("extraction", &e.to_string());
                return format!("Error processing your information: {}", e);
            }
        };

        let extracted = match parse_candidate_info(&reply) {
            Ok(info) => info,
            Err(e) => {
                debug!(error = %e, "Could not parse extraction reply");
                return format!(
                    "I couldn't extract the information. Please provide details in this format:\n{}",
                    EXAMPLE_FORMAT
                );
            }
        };

        session.candidate.merge(extracted);
        let report = validate_candidate_info(&session.candidate);

        self.logger.log(&LogEvent::InfoExtracted {
            fields: session.candidate.provided().len(),
            missing: report.missing.iter().map(|f| f.label().to_string()).collect(),
            invalid: report.invalid.iter().map(|f| f.to_string()).collect(),
        });

        if !report.is_complete() {
            return info_feedback(&report);
        }

        self.start_interview(session).await
    }

    async fn start_interview(&mut self, session: &mut Session) -> String {
        let stack = tech_stack(session);
        let prompt = ScreeningPrompts::build_questions_prompt(&stack, session.language);

        let questions = match self.chat.send(&prompt).await {
            Ok(reply) => parse_numbered_questions(&reply),
            Err(e) => {
                warn!(error = %e, "Question generation failed");
                self.log_error("question_generation", &e.to_string());
                Vec::new()
            }
        };

        let Some(first) = questions.first().cloned() else {
            return QUESTIONS_FAILED.to_string();
        };

        self.logger.log(&LogEvent::QuestionsGenerated {
            count: questions.len(),
        });
        info!(count = questions.len(), "Candidate info collected, asking questions");

        session.phase = Phase::AskingQuestions(Interview::new(questions));
        format!(
            "Thanks {}! First question:\n\n{}",
            session.candidate.first_name(),
            first
        )
    }

    /// Switch the conversation language and rebuild the model chat from the
    /// visible log. Returns the notice appended to the log, or None when the
    /// language is unchanged.
    pub fn change_language(&mut self, session: &mut Session, language: Language) -> Option<String> {
        if session.language == language {
            return None;
        }

        let from = session.language;
        session.language = language;
        self.chat
            .rebuild(ScreeningPrompts::history_for(language, &session.messages));

        self.logger.log(&LogEvent::LanguageChanged {
            from: from.to_string(),
            to: language.to_string(),
            history_turns: self.chat.history().len(),
        });

        let notice = format!(
            "Language changed to **{}**. Please continue the conversation. New responses will be in this language.",
            language
        );
        session.push_assistant(notice.clone());
        Some(notice)
    }

    /// Start over: a fresh session in `language` and a freshly seeded chat
    pub fn reset(&mut self, language: Language) -> Session {
        let session = Session::new(language);
        self.chat
            .rebuild(ScreeningPrompts::history_for(language, &session.messages));
        self.logger.log(&LogEvent::SessionReset);
        session
    }

    fn log_error(&self, stage: &str, error: &str) {
        self.logger.log(&LogEvent::ErrorEncountered {
            stage: stage.to_string(),
            error: error.to_string(),
        });
    }
}
