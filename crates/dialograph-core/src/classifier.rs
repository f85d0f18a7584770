//! Input classification: resolving raw user text to the next state.
//!
//! A [`Classifier`] picks one [`Candidate`] for a piece of text. The shipped
//! [`LevenshteinClassifier`] accepts the candidate with the smallest edit
//! distance, provided `distance < len(input) / 2`.
//!
//! [`next_state`] is the engine-facing entry point: it first tries the steps
//! leaving the current state (the contextual menu), then falls back to the
//! entry vectors (global commands).

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};
use crate::ids::StateId;
use crate::model::InputDescription;
use crate::port::ScenarioPort;
use crate::scenario::Scenario;

/// A vector together with the state it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub vector: InputDescription,
    pub target: StateId,
}

pub trait Classifier {
    /// Pick the target of the best candidate, or fail `NoMatch`.
    ///
    /// Candidates are visited in slice order; on equal scores the earlier
    /// candidate wins.
    fn classify(&self, raw_input: &str, candidates: &[Candidate]) -> Result<StateId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevenshteinClassifier {
    /// A match needs `distance * threshold_divisor < len(input)`.
    pub threshold_divisor: usize,
}

impl Default for LevenshteinClassifier {
    fn default() -> Self {
        Self {
            threshold_divisor: 2,
        }
    }
}

impl LevenshteinClassifier {
    pub fn new(threshold_divisor: usize) -> Self {
        Self {
            threshold_divisor: threshold_divisor.max(1),
        }
    }

    pub fn accepts(&self, distance: usize, input_len: usize) -> bool {
        distance.saturating_mul(self.threshold_divisor) < input_len
    }
}

impl Classifier for LevenshteinClassifier {
    fn classify(&self, raw_input: &str, candidates: &[Candidate]) -> Result<StateId> {
        let normalized: Vec<char> = raw_input.to_lowercase().chars().collect();
        let input_len = raw_input.chars().count();

        let mut best: Option<(usize, &Candidate)> = None;
        for candidate in candidates {
            let Some(distance) = candidate.vector.distance(&normalized) else {
                continue;
            };
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, candidate));
            }
            if distance == 0 {
                break;
            }
        }

        match best {
            Some((distance, candidate)) if self.accepts(distance, input_len) => {
                tracing::trace!(
                    input = raw_input,
                    vector = %candidate.vector.name(),
                    distance,
                    "input classified"
                );
                Ok(candidate.target)
            }
            Some((distance, candidate)) => {
                tracing::trace!(
                    input = raw_input,
                    vector = %candidate.vector.name(),
                    distance,
                    input_len,
                    "best candidate above threshold"
                );
                Err(ScenarioError::NoMatch(raw_input.to_string()))
            }
            None => Err(ScenarioError::NoMatch(raw_input.to_string())),
        }
    }
}

/// Resolve the state reached from `current` by `raw_input`.
///
/// Contextual steps are tried first; only a `NoMatch` there falls through to
/// the global entry commands. Any other error propagates unchanged.
pub fn next_state<P, C>(
    classifier: &C,
    scenario: &Scenario<P>,
    raw_input: &str,
    current: StateId,
) -> Result<StateId>
where
    P: ScenarioPort,
    C: Classifier + ?Sized,
{
    let contextual = scenario.contextual_candidates(current)?;
    match classifier.classify(raw_input, &contextual) {
        Err(err) if err.is_no_match() => {
            tracing::debug!(state_id = %current, "no contextual match, trying global commands");
            let global = scenario.global_candidates()?;
            classifier.classify(raw_input, &global)
        }
        other => other,
    }
}

/// Levenshtein distance between two character sequences.
///
/// Two-row dynamic programming; callers normalize case beforehand.
pub fn edit_distance(value: &[char], needle: &[char]) -> usize {
    let n = needle.len();
    if value.is_empty() {
        return n;
    }
    if n == 0 {
        return value.len();
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, c) in value.iter().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = if *c == needle[j - 1] { 0 } else { 1 };
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;
            let substitution = prev[j - 1] + cost;
            curr[j] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
