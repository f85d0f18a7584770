//! Identifiers and validated strings.
//!
//! Ids are assigned by the persistence port and are opaque to callers.
//! Names are trimmed and must not be blank; free text (answers,
//! descriptions) is trimmed but may be empty.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::ScenarioError;

/// Id of a conversational state, unique within one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct StateId(u64);

impl StateId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StateId {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(StateId)
            .map_err(|e| ScenarioError::Invalid(format!("state id `{s}`: {e}")))
    }
}

/// Id of a scenario (the `projects` row of a SQL-backed store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ScenarioId(u64);

impl ScenarioId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScenarioId {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ScenarioId)
            .map_err(|e| ScenarioError::Invalid(format!("scenario id `{s}`: {e}")))
    }
}

/// A trimmed, non-blank name. Used for state names and vector names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(value: impl Into<String>) -> Result<Self, ScenarioError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScenarioError::Invalid("name must not be blank".to_string()));
        }
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Default name of a state created without one.
    pub fn from_state_id(id: StateId) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Name {
    type Error = ScenarioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Name::new(value)
    }
}

impl TryFrom<&str> for Name {
    type Error = ScenarioError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Name::new(value)
    }
}

impl From<Name> for String {
    fn from(value: Name) -> Self {
        value.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed free text: answers rendered to the user and descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceText(String);

impl SourceText {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for SourceText {
    fn from(value: String) -> Self {
        SourceText::new(value)
    }
}

impl From<&str> for SourceText {
    fn from(value: &str) -> Self {
        SourceText::new(value)
    }
}

impl From<SourceText> for String {
    fn from(value: SourceText) -> Self {
        value.0
    }
}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed_and_rejects_blank() {
        assert_eq!(Name::new("  Помощь ").unwrap().as_str(), "Помощь");
        assert!(Name::new("   ").is_err());
        assert!(Name::new("").is_err());
    }

    #[test]
    fn test_name_deserialization_validates() {
        let ok: Name = serde_json::from_str("\" Старт \"").unwrap();
        assert_eq!(ok, "Старт");
        assert!(serde_json::from_str::<Name>("\"  \"").is_err());
    }

    #[test]
    fn test_source_text_keeps_empty() {
        assert!(SourceText::new("  \n ").is_empty());
        assert_eq!(SourceText::new(" Привет! ").as_str(), "Привет!");
    }

    #[test]
    fn test_state_id_parses_from_document_text() {
        assert_eq!(" 42 ".parse::<StateId>().unwrap(), StateId::new(42));
        assert!("forty-two".parse::<StateId>().is_err());
    }
}
