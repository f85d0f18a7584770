//! Persistence port: the storage contract a scenario runs on.
//!
//! Adapters translate these calls into their own storage and nothing else.
//! Cross-entity rules (entry naming, required states, vector usage) are
//! enforced by [`crate::Scenario`], never here, so an in-memory map and a SQL
//! backend stay interchangeable. Adapter transport failures surface as
//! [`ScenarioError::Backend`](crate::ScenarioError::Backend).

use std::collections::BTreeMap;

use crate::error::Result;
use crate::ids::{Name, SourceText, StateId};
use crate::model::{Connections, InputDescription, State, StateAttrs, Step};

pub trait ScenarioPort {
    // ------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------

    /// Insert a state; the store assigns the id.
    fn create_state(&mut self, attrs: StateAttrs, required: bool) -> Result<State>;

    fn delete_state(&mut self, id: StateId) -> Result<()>;

    /// All states for `None`; otherwise exactly the given ids, failing
    /// `NotFound` on the first id that is missing.
    fn states(&self, ids: Option<&[StateId]>) -> Result<BTreeMap<StateId, State>>;

    /// Steps whose source or target is `id`.
    fn steps_touching(&self, id: StateId) -> Result<Vec<Step>>;

    fn is_entry(&self, id: StateId) -> Result<bool>;

    fn set_answer(&mut self, id: StateId, output: SourceText) -> Result<()>;

    fn set_description(&mut self, id: StateId, description: SourceText) -> Result<()>;

    fn rename_state(&mut self, id: StateId, name: Name) -> Result<()>;

    // ------------------------------------------------------------------
    // Vectors
    // ------------------------------------------------------------------

    fn add_vector(&mut self, vector: InputDescription) -> Result<()>;

    fn remove_vector(&mut self, name: &Name) -> Result<()>;

    fn get_vector(&self, name: &Name) -> Result<InputDescription>;

    fn vector_exists(&self, name: &Name) -> Result<bool>;

    /// Overwrite the payload of an existing vector with the same name.
    fn update_vector(&mut self, vector: InputDescription) -> Result<()>;

    /// Every vector, in registration order.
    fn vectors(&self) -> Result<Vec<InputDescription>>;

    /// Rename a vector and every step referencing it.
    fn rename_vector(&mut self, old: &Name, new: Name) -> Result<()>;

    // ------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------

    /// Add a step, merging it into the existing (from, to) connection if one
    /// exists.
    fn new_step(&mut self, from: Option<StateId>, to: StateId, vector: &Name) -> Result<Step>;

    /// Delete every step from `from` matching the optional target and vector
    /// filters. Connections left without steps are dropped.
    fn delete_step(
        &mut self,
        from: Option<StateId>,
        to: Option<StateId>,
        vector: Option<&Name>,
    ) -> Result<()>;

    fn connections(&self) -> Result<Connections>;
}
