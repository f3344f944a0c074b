use std::collections::BTreeMap;

use talentscout_agent::ChatTurn;

use crate::session::{AnswerRecord, Message, Role};
use crate::Language;

const SYSTEM_PROMPT: &str = r#"You are TalentScout, an AI Hiring Assistant for tech recruitment. Your primary goal is to systematically gather essential candidate information (Full Name, Email, Phone, Years of Experience, Desired Position(s), Current Location, Tech Stack) and then generate 3-5 relevant technical questions based on their declared tech stack.

Maintain a polite, professional, and helpful tone. Keep interactions coherent and context-aware. If you don't understand an input, politely ask for clarification or guide the user back to the main purpose. Always stay on topic for hiring assistance.

Only provide a final, concise technical assessment after the candidate indicates they have finished answering the questions (e.g., by saying 'done' or 'thank you'). Do not generate closing remarks or assessments until all required information is gathered, the technical questions are answered, and the candidate signals completion."#;

const SYSTEM_ACK: &str = "Understood. I will follow the specified process for technical screening.";

/// Prompt templates for every model call the controller makes
pub struct ScreeningPrompts;

impl ScreeningPrompts {
    /// Opening turns of every chat: instructions, acknowledgment and, for
    /// non-default languages, a language lock with its own acknowledgment.
    pub fn seed_turns(language: Language) -> Vec<ChatTurn> {
        let mut turns = vec![ChatTurn::user(SYSTEM_PROMPT), ChatTurn::model(SYSTEM_ACK)];

        if !language.is_default() {
            turns.push(ChatTurn::user(format!(
                "From now on, all your responses and interactions MUST be exclusively in {lang}. You are forbidden from using any other language. Translate all your output into {lang}.",
                lang = language
            )));
            turns.push(ChatTurn::model(format!(
                "Understood. I will now respond ONLY in {}.",
                language
            )));
        }

        turns
    }

    /// Seed turns followed by the visible chat log, welcome message excluded
    pub fn history_for(language: Language, messages: &[Message]) -> Vec<ChatTurn> {
        let replay = messages
            .iter()
            .filter(|msg| !msg.is_welcome())
            .map(|msg| match msg.role {
                Role::User => ChatTurn::user(msg.content.clone()),
                Role::Assistant => ChatTurn::model(msg.content.clone()),
            });

        Self::seed_turns(language).into_iter().chain(replay).collect()
    }

    pub fn build_extraction_prompt(user_input: &str, language: Language) -> String {
        format!(
            r#"Extract the following from: {input}

Provide it as JSON in a ```json fenced block with exactly these fields (use "N/A" if unknown):
```json
{{
    "Full Name": "...",
    "Email Address": "...",
    "Phone Number": "...",
    "Years of Experience": "...",
    "Desired Position(s)": "...",
    "Current Location": "...",
    "Tech Stack": "..."
}}
```

All responses, including confirmations or requests for clarification, MUST be exclusively in {lang}."#,
            input = user_input,
            lang = language,
        )
    }

    pub fn build_questions_prompt(tech_stack: &str, language: Language) -> String {
        format!(
            r#"Generate 3-5 technical questions for a candidate with this tech stack: {stack}

Requirements:
- Each question should test practical, hands-on knowledge.
- Include at least one question about system design.
- Include at least one question about debugging/optimization.
- Questions should require detailed explanations, not just yes/no answers.
- Format as a numbered list ("1. ...", "2. ..."), one question per line.
- Avoid generic "what is" questions.
- All questions MUST be exclusively in {lang}."#,
            stack = tech_stack,
            lang = language,
        )
    }

    pub fn build_follow_up_prompt(
        question: &str,
        answer: &str,
        tech_stack: &str,
        language: Language,
    ) -> String {
        format!(
            r#"Based on this technical exchange:
Question: "{question}"
Answer: "{answer}"

Generate exactly ONE follow-up question that:
1. Targets the most important technical concept from the original question or answer.
2. Asks for specific examples or implementation details.
3. References these technologies if relevant: {stack}
4. Is 1-2 sentences maximum.
5. MUST be exclusively in {lang}.

Example formats:
- "How would you implement this using [TECH]?"
- "What metrics would you use to measure success?"
- "How would this approach scale to 1 million users?"

Make it specific and technical."#,
            question = question,
            answer = answer,
            stack = tech_stack,
            lang = language,
        )
    }

    pub fn build_assessment_prompt(
        tech_stack: &str,
        answers: &BTreeMap<usize, AnswerRecord>,
        language: Language,
    ) -> String {
        format!(
            r#"Candidate Tech Stack: {stack}

Questions and Answers:
{qa}

Provide a concise technical assessment (3-4 sentences) that:
1. Highlights 2 specific strengths demonstrated in the answers.
2. Identifies 2 concrete areas for improvement.
3. Assesses overall technical competency (1-5 scale).
4. Avoids generic statements: be specific to the answers given and note the overall tone or confidence conveyed in the responses.
5. Does not make hiring recommendations.
6. All output MUST be exclusively in {lang}."#,
            stack = tech_stack,
            qa = format_answers(answers),
            lang = language,
        )
    }
}

/// Question/answer pairs in question order, multiple answers joined by spaces
pub fn format_answers(answers: &BTreeMap<usize, AnswerRecord>) -> String {
    answers
        .iter()
        .map(|(index, record)| {
            format!(
                "Question {}: {}\nAnswer: {}\n",
                index + 1,
                record.question,
                record.answers.join(" ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::WELCOME_MESSAGE;
    use talentscout_agent::TurnRole;

    #[test]
    fn test_seed_turns_default_language() {
        let turns = ScreeningPrompts::seed_turns(Language::English);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[1].role, TurnRole::Model);
    }

    #[test]
    fn test_seed_turns_language_lock() {
        let turns = ScreeningPrompts::seed_turns(Language::French);
        assert_eq!(turns.len(), 4);
        assert!(turns[2].text.contains("exclusively in French"));
        assert_eq!(turns[3].text, "Understood. I will now respond ONLY in French.");
    }

    #[test]
    fn test_history_skips_welcome() {
        let messages = vec![
            Message::assistant(WELCOME_MESSAGE),
            Message::user("John Doe"),
            Message::assistant("Please provide your email"),
        ];
        let turns = ScreeningPrompts::history_for(Language::English, &messages);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2], ChatTurn::user("John Doe"));
        assert_eq!(turns[3], ChatTurn::model("Please provide your email"));
    }

    #[test]
    fn test_format_answers_joins_attempts() {
        let mut answers = BTreeMap::new();
        answers.insert(
            2,
            AnswerRecord {
                question: "3. Debug a leak".to_string(),
                answers: vec!["idk".to_string(), "use a profiler".to_string()],
                complete: true,
            },
        );
        let formatted = format_answers(&answers);
        assert_eq!(
            formatted,
            "Question 3: 3. Debug a leak\nAnswer: idk use a profiler\n"
        );
    }
}
