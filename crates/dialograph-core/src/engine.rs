//! Turn-taking engine.
//!
//! An [`Engine`] holds exactly one piece of mutable state, the current
//! [`State`]. It is built per request by the host, which owns session
//! storage and restores the current state through [`Engine::set_current_state`].
//! Not safe for concurrent use of one instance.

use crate::classifier::{next_state, Classifier, LevenshteinClassifier};
use crate::error::Result;
use crate::model::State;
use crate::port::ScenarioPort;
use crate::scenario::Scenario;

/// Fallback text for turns nothing matched.
pub const NOT_UNDERSTOOD: &str = "Извините, я вас не понял";

/// Outcome of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    /// `false` when the input was not understood and the state was kept.
    pub understood: bool,
}

pub struct Engine<'s, P: ScenarioPort, C: Classifier = LevenshteinClassifier> {
    scenario: &'s Scenario<P>,
    classifier: C,
    current: State,
    not_understood: String,
}

impl<'s, P: ScenarioPort, C: Classifier> Engine<'s, P, C> {
    pub fn new(scenario: &'s Scenario<P>, classifier: C, current: State) -> Self {
        Self {
            scenario,
            classifier,
            current,
            not_understood: NOT_UNDERSTOOD.to_string(),
        }
    }

    pub fn with_not_understood(mut self, text: impl Into<String>) -> Self {
        self.not_understood = text.into();
        self
    }

    pub fn current_state(&self) -> &State {
        &self.current
    }

    pub fn set_current_state(&mut self, state: State) {
        self.current = state;
    }

    /// Classify `text` against the current state and advance.
    ///
    /// Only `NoMatch` becomes the fallback response; every other error
    /// propagates and leaves the current state untouched.
    pub fn handle(&mut self, text: &str) -> Result<Response> {
        match next_state(&self.classifier, self.scenario, text, self.current.id) {
            Ok(id) => {
                let state = self.scenario.state(id)?;
                tracing::debug!(
                    from = %self.current.id,
                    to = %state.id,
                    name = %state.name,
                    "turn resolved"
                );
                let text = state.output.as_str().to_string();
                self.current = state;
                Ok(Response {
                    text,
                    understood: true,
                })
            }
            Err(err) if err.is_no_match() => {
                tracing::info!(state_id = %self.current.id, input = text, "input not understood");
                Ok(Response {
                    text: self.not_understood.clone(),
                    understood: false,
                })
            }
            Err(err) => Err(err),
        }
    }
}
