use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse intent of an incoming message; decides retrieval and template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    ContextSpecific,
    Casual,
    Generic,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContextSpecific => "context-specific",
            Self::Casual => "casual",
            Self::Generic => "generic",
        }
    }

    /// Reads a label out of free-form generator output.
    ///
    /// Case-insensitive containment, checked in priority order
    /// `context-specific`, `casual`, `generic`. Output naming none of them
    /// falls back to `Casual`.
    pub fn from_response(response: &str) -> Self {
        let response = response.trim().to_lowercase();

        [Self::ContextSpecific, Self::Casual, Self::Generic]
            .into_iter()
            .find(|label| response.contains(label.as_str()))
            .unwrap_or(Self::Casual)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
