//! Scenario entities: states, input vectors, connections and steps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, ScenarioError};
use crate::ids::{Name, ScenarioId, SourceText, StateId};

// ============================================================================
// Scenario
// ============================================================================

/// Identity and descriptive metadata of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub id: ScenarioId,
    pub name: SourceText,
    pub description: SourceText,
}

impl ScenarioInfo {
    pub fn new(id: ScenarioId, name: impl Into<SourceText>) -> Self {
        Self {
            id,
            name: name.into(),
            description: SourceText::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<SourceText>) -> Self {
        self.description = description.into();
        self
    }
}

// ============================================================================
// States
// ============================================================================

/// A conversational state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: Name,
    pub description: SourceText,
    /// Answer rendered verbatim to the user when the state is reached.
    pub output: SourceText,
    /// Set once at creation; required states can't be deleted or unbound.
    pub required: bool,
}

/// Attributes supplied when creating a state.
///
/// A missing name is replaced by the decimal id assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateAttrs {
    pub name: Option<Name>,
    pub description: SourceText,
}

impl StateAttrs {
    pub fn named(name: Name) -> Self {
        Self {
            name: Some(name),
            description: SourceText::default(),
        }
    }

    /// Build from raw editor input; a blank name becomes `None`.
    pub fn from_raw(name: &str, description: &str) -> Self {
        Self {
            name: Name::new(name).ok(),
            description: SourceText::new(description),
        }
    }

    pub fn with_description(mut self, description: impl Into<SourceText>) -> Self {
        self.description = description.into();
        self
    }

    /// Resolve the final state name once the store has assigned `id`.
    pub fn resolved_name(&self, id: StateId) -> Name {
        match &self.name {
            Some(name) => name.clone(),
            None => Name::from_state_id(id),
        }
    }
}

// ============================================================================
// Input vectors
// ============================================================================

/// Synonym-list vector matched by edit distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevenshteinVector {
    name: Name,
    synonyms: Vec<String>,
}

impl LevenshteinVector {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            synonyms: Vec::new(),
        }
    }

    pub fn with_synonyms<I, S>(name: Name, synonyms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vector = Self::new(name);
        for synonym in synonyms {
            vector.add_synonym(synonym)?;
        }
        Ok(vector)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    pub fn add_synonym(&mut self, value: impl Into<String>) -> Result<()> {
        let value = normalize_synonym(value.into())?;
        if self.synonyms.contains(&value) {
            return Err(ScenarioError::Conflict(format!(
                "synonym `{value}` already exists in vector `{}`",
                self.name
            )));
        }
        self.synonyms.push(value);
        Ok(())
    }

    pub fn remove_synonym(&mut self, value: &str) -> Result<()> {
        let idx = self.position(value)?;
        self.synonyms.remove(idx);
        Ok(())
    }

    /// Replace `old` in place, keeping its position in the list.
    pub fn rename_synonym(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let idx = self.position(old)?;
        let new = normalize_synonym(new.into())?;
        if self.synonyms[idx] == new {
            return Ok(());
        }
        if self.synonyms.contains(&new) {
            return Err(ScenarioError::Conflict(format!(
                "synonym `{new}` already exists in vector `{}`",
                self.name
            )));
        }
        self.synonyms[idx] = new;
        Ok(())
    }

    fn position(&self, value: &str) -> Result<usize> {
        self.synonyms
            .iter()
            .position(|s| s == value.trim())
            .ok_or_else(|| {
                ScenarioError::NotFound(format!(
                    "synonym `{value}` in vector `{}`",
                    self.name
                ))
            })
    }
}

fn normalize_synonym(value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScenarioError::Invalid("synonym must not be blank".to_string()));
    }
    Ok(trimmed.to_string())
}

/// A named classifier of free-text input.
///
/// Every variant exposes the same capability: a distance between the
/// normalized input and the vector, where lower is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputDescription {
    Levenshtein(LevenshteinVector),
}

impl InputDescription {
    pub fn name(&self) -> &Name {
        match self {
            InputDescription::Levenshtein(v) => v.name(),
        }
    }

    /// Stable tag stored alongside the vector (`vectors.type` column).
    pub fn type_tag(&self) -> &'static str {
        match self {
            InputDescription::Levenshtein(_) => "levenshtein",
        }
    }

    /// Smallest distance between `input` (already lower-cased, as chars) and
    /// any phrase of this vector. `None` when the vector has no phrases.
    pub fn distance(&self, input: &[char]) -> Option<usize> {
        match self {
            InputDescription::Levenshtein(v) => v
                .synonyms
                .iter()
                .map(|synonym| {
                    let synonym: Vec<char> = synonym.to_lowercase().chars().collect();
                    crate::classifier::edit_distance(&synonym, input)
                })
                .min(),
        }
    }

    /// The same payload under another name.
    pub fn renamed(self, name: Name) -> Self {
        match self {
            InputDescription::Levenshtein(mut v) => {
                v.name = name;
                InputDescription::Levenshtein(v)
            }
        }
    }

    pub fn as_levenshtein(&self) -> Option<&LevenshteinVector> {
        match self {
            InputDescription::Levenshtein(v) => Some(v),
        }
    }

    pub fn as_levenshtein_mut(&mut self) -> Option<&mut LevenshteinVector> {
        match self {
            InputDescription::Levenshtein(v) => Some(v),
        }
    }
}

impl From<LevenshteinVector> for InputDescription {
    fn from(value: LevenshteinVector) -> Self {
        InputDescription::Levenshtein(value)
    }
}

// ============================================================================
// Connections and steps
// ============================================================================

/// One (vector, target) pairing. `from == None` marks an entry step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    pub from: Option<StateId>,
    pub to: StateId,
    pub vector: Name,
}

impl Step {
    pub fn is_entry(&self) -> bool {
        self.from.is_none()
    }
}

/// All steps sharing one (from, to) pair, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: Option<StateId>,
    pub to: StateId,
    pub vectors: Vec<Name>,
}

impl Connection {
    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.vectors.iter().map(move |vector| Step {
            from: self.from,
            to: self.to,
            vector: vector.clone(),
        })
    }

    pub fn touches(&self, id: StateId) -> bool {
        self.to == id || self.from == Some(id)
    }
}

/// Both connection indexes of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connections {
    /// Source state → outbound connections.
    pub edges: BTreeMap<StateId, Vec<Connection>>,
    /// Target state → inbound entry connection.
    pub entries: BTreeMap<StateId, Connection>,
}

impl Connections {
    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.entries
            .values()
            .chain(self.edges.values().flatten())
            .flat_map(Connection::steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::new(s).unwrap()
    }

    #[test]
    fn test_synonyms_reject_duplicates_and_keep_order() {
        let mut v = LevenshteinVector::new(name("Помощь"));
        v.add_synonym("помощь").unwrap();
        v.add_synonym("Help").unwrap();
        let err = v.add_synonym(" помощь ").unwrap_err();
        assert!(matches!(err, ScenarioError::Conflict(_)));
        assert_eq!(v.synonyms(), ["помощь", "Help"]);
    }

    #[test]
    fn test_rename_synonym_keeps_position() {
        let mut v =
            LevenshteinVector::with_synonyms(name("Меню"), ["один", "два", "три"]).unwrap();
        v.rename_synonym("два", "2").unwrap();
        assert_eq!(v.synonyms(), ["один", "2", "три"]);
        assert!(matches!(
            v.rename_synonym("один", "три"),
            Err(ScenarioError::Conflict(_))
        ));
        assert!(matches!(
            v.remove_synonym("четыре"),
            Err(ScenarioError::NotFound(_))
        ));
    }

    #[test]
    fn test_unnamed_state_attrs_resolve_to_id() {
        let attrs = StateAttrs::from_raw("   ", "описание");
        assert_eq!(attrs.resolved_name(StateId::new(7)), "7");
        assert_eq!(attrs.description.as_str(), "описание");
    }

    #[test]
    fn test_distance_lowercases_synonyms() {
        let v: InputDescription =
            LevenshteinVector::with_synonyms(name("Помощь"), ["ПОМОЩЬ"]).unwrap().into();
        let input: Vec<char> = "помощь".chars().collect();
        assert_eq!(v.distance(&input), Some(0));
        let empty: InputDescription = LevenshteinVector::new(name("Пусто")).into();
        assert_eq!(empty.distance(&input), None);
    }
}
