//! Dialograph core: dialogue scenarios as graphs of conversational states.
//!
//! ```text
//!   author ──► Scenario (invariants) ──► ScenarioPort (storage)
//!                  ▲
//!   user text ─► Engine ─► Classifier ─┘ (read-only queries)
//! ```
//!
//! - [`Scenario`] is the aggregate. It owns every structural rule over
//!   states, vectors, entries and steps.
//! - [`ScenarioPort`] is the storage contract; [`InMemoryPort`] is the
//!   process-lifetime implementation.
//! - [`Classifier`] resolves free text to a step target;
//!   [`LevenshteinClassifier`] matches synonyms by edit distance.
//! - [`Engine`] runs one turn: current state + text → answer.

pub mod classifier;
pub mod engine;
pub mod error;
pub mod ids;
pub mod memory;
pub mod model;
pub mod port;
pub mod scenario;


pub use classifier::{edit_distance, next_state, Candidate, Classifier, LevenshteinClassifier};
pub use engine::{Engine, Response, NOT_UNDERSTOOD};
pub use error::{ErrorKind, Result, ScenarioError};
pub use ids::{Name, ScenarioId, SourceText, StateId};
pub use memory::InMemoryPort;
pub use model::{
    Connection, Connections, InputDescription, LevenshteinVector, ScenarioInfo, State, StateAttrs,
    Step,
};
pub use port::ScenarioPort;
pub use scenario::{RequiredState, Scenario, DEFAULT_REQUIRED_STATES};
