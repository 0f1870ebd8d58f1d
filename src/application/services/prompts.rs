use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::{
    Classification, ConversationHistory, ConversationTurn, ScoredChunk, MAX_HISTORY_TURNS,
};

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*[ \t]+(.*)\n?").expect("bullet pattern is valid"));

/// Whose profile is being answered for, and how to reach them.
///
/// Both come from the `persona` configuration section; `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    pub name: String,
    pub contact: String,
}

/// Converts generator markdown into the inline markup the chat UI renders.
///
/// `**bold**` becomes `<b>bold</b>`; a line starting with `* ` becomes a
/// single-item `<ul><li>..</li></ul>` and loses its line break.
pub fn format_response(text: &str) -> String {
    let text = BOLD.replace_all(text, "<b>$1</b>");
    BULLET.replace_all(&text, "<ul><li>$1</li></ul>").into_owned()
}

/// Prompt text plus the turns handed to the generator beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt<'a> {
    pub text: String,
    pub history: &'a [ConversationTurn],
}

/// Fills the answer templates.
///
/// Templates never inline the conversation: the most recent turns are
/// returned as structured history and each generator renders them its own
/// way.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    persona: Persona,
    max_history_turns: usize,
}

impl PromptAssembler {
    pub fn new(persona: Persona) -> Self {
        Self {
            persona,
            max_history_turns: MAX_HISTORY_TURNS,
        }
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }

    /// Picks the template for `classification`.
    ///
    /// `chunks` is only consulted for context-specific messages.
    pub fn assemble<'a>(
        &self,
        classification: Classification,
        message: &str,
        history: &'a ConversationHistory,
        chunks: &[ScoredChunk],
    ) -> AssembledPrompt<'a> {
        let text = match classification {
            Classification::ContextSpecific if !chunks.is_empty() => {
                self.grounded(message, chunks)
            }
            Classification::ContextSpecific => self.no_information(message),
            Classification::Casual => self.casual(message),
            Classification::Generic => self.generic(message),
        };

        AssembledPrompt {
            text,
            history: history.recent(self.max_history_turns),
        }
    }

    pub fn grounded(&self, message: &str, chunks: &[ScoredChunk]) -> String {
        let name = &self.persona.name;
        let context = chunks
            .iter()
            .map(|c| format!("{}\n{}", c.source_tag(), c.chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Information about {name}:\n{context}\n\n\
             Question: {message}\n\n\
             You are {name}'s AI assistant. Answer the question about {name} directly and \
             naturally using the information provided. Do not mention where the information \
             came from and do not hedge. Don't repeat greetings or summarize the previous \
             conversation unless asked."
        )
    }

    pub fn no_information(&self, message: &str) -> String {
        let name = &self.persona.name;
        let contact = if self.persona.contact.is_empty() {
            String::new()
        } else {
            format!(" at {}", self.persona.contact)
        };

        format!(
            "Question: {message}\n\n\
             You are {name}'s AI assistant. You have no information about this in {name}'s \
             profile. Say so briefly and kindly without guessing, and suggest reaching out to \
             {name} directly{contact}. Don't use repetitive greetings."
        )
    }

    pub fn casual(&self, message: &str) -> String {
        let name = &self.persona.name;
        format!(
            "User message: {message}\n\n\
             You are {name}'s AI assistant. The user is making casual conversation. Respond \
             naturally and friendly, then gently guide them to ask about {name} if appropriate.\n\n\
             DO:\n\
             - Be warm and conversational\n\
             - Acknowledge their casual message naturally\n\
             - Suggest they can ask about {name}\n\
             - Match their energy level\n\n\
             DON'T:\n\
             - Be robotic or rude\n\
             - Just say \"Only {name}-related questions\"\n\
             - Ignore their casual message\n\
             - Be overly formal"
        )
    }

    pub fn generic(&self, message: &str) -> String {
        let name = &self.persona.name;
        format!(
            "User message: {message}\n\n\
             You are {name}'s AI assistant. The user asked about something unrelated to {name}. \
             Respond politely that you specialize in questions about {name}, but do it in a \
             friendly way.\n\n\
             DO:\n\
             - Be polite and understanding\n\
             - Acknowledge their question\n\
             - Explain your role nicely\n\
             - Invite them to ask about {name}\n\n\
             DON'T:\n\
             - Be rude or dismissive\n\
             - Just say \"No\" or \"Only {name}-related questions\"\n\
             - Ignore their question completely"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chunk, SourceType};

    fn assembler() -> PromptAssembler {
        PromptAssembler::new(Persona {
            name: "Naisarg".into(),
            contact: "naisarg@example.com".into(),
        })
    }

    fn skills_chunk() -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(SourceType::Resume, "Technical Skills: Python, Go.", 7)
                .with_section("skills"),
            score: 0.92,
        }
    }

    #[test]
    fn test_format_response_bold_and_bullets() {
        assert_eq!(format_response("Knows **Python** well"), "Knows <b>Python</b> well");
        assert_eq!(
            format_response("Skills:\n* **Python**\n* Go\nThat's it."),
            "Skills:\n<ul><li><b>Python</b></li></ul><ul><li>Go</li></ul>That's it."
        );
    }

    #[test]
    fn test_format_response_leaves_plain_text() {
        let text = "No markup here.\nSecond line with a*b.";
        assert_eq!(format_response(text), text);
    }

    #[test]
    fn test_grounded_prompt_contains_tagged_chunks() {
        let history = ConversationHistory::parse("User: hi\nAssistant: hello!");
        let prompt = assembler().assemble(
            Classification::ContextSpecific,
            "What are Naisarg's skills?",
            &history,
            &[skills_chunk()],
        );

        assert!(prompt.text.starts_with("Information about Naisarg:\n"));
        assert!(prompt
            .text
            .contains("[Source: resume - skills - Chunk 7]\nTechnical Skills: Python, Go."));
        assert!(prompt.text.contains("Question: What are Naisarg's skills?"));
        assert!(!prompt.text.contains("User: hi"));
        assert_eq!(prompt.history, history.turns());
    }

    #[test]
    fn test_no_information_prompt_points_to_contact() {
        let history = ConversationHistory::default();
        let prompt = assembler().assemble(
            Classification::ContextSpecific,
            "What is Naisarg's blood type?",
            &history,
            &[],
        );

        assert!(!prompt.text.contains("[Source:"));
        assert!(prompt.text.contains("no information"));
        assert!(prompt.text.contains("at naisarg@example.com"));
        assert!(prompt.history.is_empty());
    }

    #[test]
    fn test_casual_and_generic_templates() {
        let history = ConversationHistory::default();
        let casual = assembler().assemble(Classification::Casual, "lol", &history, &[skills_chunk()]);
        let generic =
            assembler().assemble(Classification::Generic, "Capital of France?", &history, &[]);

        assert!(casual.text.contains("casual conversation"));
        assert!(!casual.text.contains("Technical Skills"));
        assert!(generic.text.contains("unrelated to Naisarg"));
        assert!(generic.text.contains("User message: Capital of France?"));
    }

    #[test]
    fn test_history_is_bounded() {
        let raw = (0..15)
            .map(|i| format!("User: question {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let history = ConversationHistory::parse(&raw);

        let prompt = assembler()
            .with_max_history_turns(3)
            .assemble(Classification::Casual, "hey", &history, &[]);
        let contents: Vec<&str> = prompt.history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["question 12", "question 13", "question 14"]);
    }
}
