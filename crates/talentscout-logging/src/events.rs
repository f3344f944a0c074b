use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for a screening session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    SessionStarted {
        restored: bool,
        language: String,
        messages: usize,
        model: String,
    },
    TurnReceived {
        phase: String,
        input_len: usize,
    },
    NavigationApplied {
        command: String,
        question_index: usize,
    },
    InfoExtracted {
        fields: usize,
        missing: Vec<String>,
        invalid: Vec<String>,
    },
    QuestionsGenerated {
        count: usize,
    },
    AnswerRecorded {
        question_index: usize,
        substantive: bool,
        attempts: usize,
    },
    FollowUpIssued {
        question_index: usize,
    },
    AssessmentGenerated {
        questions_answered: usize,
    },
    LanguageChanged {
        from: String,
        to: String,
        history_turns: usize,
    },
    SessionSaved {
        path: PathBuf,
    },
    SessionReset,
    ErrorEncountered {
        stage: String,
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }

    /// Short snake_case name of the event
    pub fn name(&self) -> &'static str {
        match self {
            LogEvent::SessionStarted { .. } => "session_started",
            LogEvent::TurnReceived { .. } => "turn_received",
            LogEvent::NavigationApplied { .. } => "navigation_applied",
            LogEvent::InfoExtracted { .. } => "info_extracted",
            LogEvent::QuestionsGenerated { .. } => "questions_generated",
            LogEvent::AnswerRecorded { .. } => "answer_recorded",
            LogEvent::FollowUpIssued { .. } => "follow_up_issued",
            LogEvent::AssessmentGenerated { .. } => "assessment_generated",
            LogEvent::LanguageChanged { .. } => "language_changed",
            LogEvent::SessionSaved { .. } => "session_saved",
            LogEvent::SessionReset => "session_reset",
            LogEvent::ErrorEncountered { .. } => "error_encountered",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Dim status lines between chat messages
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for screening events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    console: bool,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            console: true,
            file_writer: None,
        }
    }

    /// A logger that drops every event (tests, non-interactive commands)
    pub fn disabled() -> Self {
        Self {
            format: LogFormat::default(),
            console: false,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            console: true,
            file_writer: Some(Mutex::new(file)),
        })
    }

    /// Keep file output but stop writing to the console
    pub fn quiet(mut self) -> Self {
        self.console = false;
        self
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if !self.console {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let line = match event {
            LogEvent::SessionStarted {
                restored,
                language,
                messages,
                model,
            } => {
                if *restored {
                    format!(
                        "{} Restored session ({} messages, {}) using {}",
                        "->".dimmed(),
                        messages,
                        language,
                        model
                    )
                } else {
                    format!("{} New session using {}", "->".dimmed(), model)
                }
            }
            LogEvent::QuestionsGenerated { count } => {
                format!("  {} {} questions generated", "✓".bright_green(), count)
            }
            LogEvent::AssessmentGenerated { questions_answered } => format!(
                "  {} Assessment generated from {} answered questions",
                "✓".bright_green(),
                questions_answered
            ),
            LogEvent::LanguageChanged {
                from,
                to,
                history_turns,
            } => format!(
                "  {} Language {} -> {} (chat rebuilt, {} turns)",
                "↻".bright_cyan(),
                from,
                to,
                history_turns
            ),
            LogEvent::SessionReset => {
                format!("  {} Session cleared", "↻".bright_cyan())
            }
            LogEvent::ErrorEncountered { stage, error } => {
                format!("  {} {} failed: {}", "✗".bright_red(), stage, error)
            }
            // Routine per-turn events stay out of the chat view
            _ => return,
        };

        let _ = writeln!(std::io::stderr(), "{}", line.dimmed());
    }

    fn log_compact(&self, event: &LogEvent) {
        let detail = match event {
            LogEvent::SessionStarted {
                restored, messages, ..
            } => format!("restored={} messages={}", restored, messages),
            LogEvent::TurnReceived { phase, input_len } => {
                format!("phase={} len={}", phase, input_len)
            }
            LogEvent::NavigationApplied {
                command,
                question_index,
            } => format!("{} -> {}", command, question_index),
            LogEvent::InfoExtracted {
                fields,
                missing,
                invalid,
            } => format!(
                "fields={} missing={} invalid={}",
                fields,
                missing.len(),
                invalid.len()
            ),
            LogEvent::QuestionsGenerated { count } => format!("count={}", count),
            LogEvent::AnswerRecorded {
                question_index,
                substantive,
                attempts,
            } => format!(
                "q={} substantive={} attempts={}",
                question_index + 1,
                substantive,
                attempts
            ),
            LogEvent::FollowUpIssued { question_index } => format!("q={}", question_index + 1),
            LogEvent::AssessmentGenerated { questions_answered } => {
                format!("answered={}", questions_answered)
            }
            LogEvent::LanguageChanged { from, to, .. } => format!("{} -> {}", from, to),
            LogEvent::SessionSaved { path } => path.display().to_string(),
            LogEvent::SessionReset => String::new(),
            LogEvent::ErrorEncountered { stage, error } => format!("{}: {}", stage, error),
        };

        let _ = writeln!(
            std::io::stderr(),
            "[talentscout] {} {}",
            event.name(),
            detail
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = LogEvent::QuestionsGenerated { count: 4 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "questions_generated");
        assert_eq!(json["count"], 4);
    }

    #[test]
    fn test_file_output_is_timestamped_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let logger = Logger::with_file(LogFormat::Pretty, &path).unwrap().quiet();

        logger.log(&LogEvent::SessionReset);
        logger.log(&LogEvent::FollowUpIssued { question_index: 1 });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "session_reset");
        assert_eq!(lines[1]["question_index"], 1);
        assert!(lines[1]["timestamp"].is_string());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
