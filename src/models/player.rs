//! Player data structure and name normalization.

use serde::{Deserialize, Serialize};

/// A player on a roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(default, alias = "capitao")]
    pub is_captain: bool,
}

impl Player {
    /// Create a non-captain player with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_captain: false,
        }
    }

    /// Create the team captain.
    pub fn captain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_captain: true,
        }
    }

    /// Name used for duplicate detection: trimmed and lowercased.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// True if the name is blank (unused roster slot).
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
