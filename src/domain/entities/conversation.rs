use serde::{Deserialize, Serialize};

/// Turns kept when history is forwarded to a generator.
pub const MAX_HISTORY_TURNS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::User => "User: ",
            Self::Assistant => "Assistant: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered turn log rebuilt from the client-supplied transcript on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }

    /// Parses a newline-delimited `User: ...` / `Assistant: ...` transcript.
    ///
    /// Prefixes are case-sensitive; lines matching neither are dropped.
    pub fn parse(raw: &str) -> Self {
        let turns = raw
            .lines()
            .filter_map(|line| {
                [Role::User, Role::Assistant].into_iter().find_map(|role| {
                    line.strip_prefix(role.prefix())
                        .map(|rest| ConversationTurn::new(role, rest))
                })
            })
            .collect();

        Self { turns }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The last `limit` turns, oldest dropped first.
    pub fn recent(&self, limit: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }

    /// Renders the most recent turns back into transcript form for prompt templates.
    pub fn transcript(&self, limit: usize) -> String {
        render_transcript(self.recent(limit))
    }
}

pub fn render_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_unprefixed_lines() {
        let history = ConversationHistory::parse("User: hi\nAssistant: hello\ngarbage");

        assert_eq!(
            history.turns(),
            &[
                ConversationTurn::user("hi"),
                ConversationTurn::assistant("hello"),
            ]
        );
    }

    #[test]
    fn test_parse_prefix_is_case_sensitive() {
        let history = ConversationHistory::parse("user: hi\nBot: hey\nUser:no space\nUser: ok");
        assert_eq!(history.turns(), &[ConversationTurn::user("ok")]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(ConversationHistory::parse("").is_empty());
    }

    #[test]
    fn test_recent_drops_oldest_first() {
        let raw = (0..14)
            .map(|i| format!("User: message {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let history = ConversationHistory::parse(&raw);

        let recent = history.recent(MAX_HISTORY_TURNS);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "message 4");
        assert_eq!(recent[9].content, "message 13");
    }

    #[test]
    fn test_transcript_round_trips() {
        let raw = "User: What does he do?\nAssistant: He builds RAG systems.";
        let history = ConversationHistory::parse(raw);
        assert_eq!(history.transcript(MAX_HISTORY_TURNS), raw);
    }
}
