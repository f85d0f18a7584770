//! # dialograph-runtime
//!
//! Serverless-style turn handling for dialograph scenarios.
//!
//! Each request carries the user's text and the id of the current state;
//! the handler rebuilds an [`dialograph_core::Engine`] for the turn and
//! returns the answer together with the next state id. On the first turn
//! the start state is found by its reserved name instead of classification.

pub mod config;
pub mod handler;
pub mod request;

pub use config::{ClassifierConfig, RuntimeConfig, ENV_CONFIG, ENV_SCENARIO};
pub use handler::{handle_once, serve, Handler};
pub use request::{Session, SkillRequest, SkillResponse};
