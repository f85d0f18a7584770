//! The scenario aggregate.
//!
//! [`Scenario`] wraps one [`ScenarioPort`] and is the only place where graph
//! invariants are checked:
//!
//! 1. every state referenced by a step exists;
//! 2. a state is an entry iff an entry connection targets it, and there is at
//!    most one such connection per state;
//! 3. two entry states never share a name;
//! 4. required states are never deleted and never lose their entry;
//! 5. a state with incident steps can't be deleted;
//! 6. vector names are unique and a vector used by a step can't be deleted;
//! 7. a state can't be renamed onto an entry-bound name, and entry states
//!    can't be renamed at all;
//! 8. entry-bound vectors can't be renamed, nor renamed onto an existing name.
//!
//! Every public mutation validates first and then delegates; multi-call
//! mutations undo their earlier port writes when a later one fails.

use std::collections::{BTreeMap, HashMap};

use crate::classifier::Candidate;
use crate::error::{Result, ScenarioError};
use crate::ids::{Name, SourceText, StateId};
use crate::memory::{display_source, InMemoryPort};
use crate::model::{
    Connections, InputDescription, LevenshteinVector, ScenarioInfo, State, StateAttrs, Step,
};
use crate::port::ScenarioPort;

/// A state created by [`Scenario::bootstrap`], bound as a required entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredState {
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
    pub answer: &'static str,
}

/// States every new scenario starts with: the start state, help and a
/// description of what the skill can do.
pub const DEFAULT_REQUIRED_STATES: &[RequiredState] = &[
    RequiredState {
        name: "Старт",
        synonyms: &["Алиса, запусти навык"],
        answer: "Привет!",
    },
    RequiredState {
        name: "Помощь",
        synonyms: &["помощь"],
        answer: "",
    },
    RequiredState {
        name: "Что ты умеешь?",
        synonyms: &["что ты умеешь"],
        answer: "",
    },
];

pub struct Scenario<P: ScenarioPort = InMemoryPort> {
    info: ScenarioInfo,
    port: P,
}

impl Scenario<InMemoryPort> {
    /// An empty scenario backed by the in-memory port.
    pub fn in_memory(info: ScenarioInfo) -> Self {
        Self::new(info, InMemoryPort::new())
    }
}

impl<P: ScenarioPort> Scenario<P> {
    pub fn new(info: ScenarioInfo, port: P) -> Self {
        Self { info, port }
    }

    /// Create a scenario whose `required` states exist and are entries.
    pub fn bootstrap(info: ScenarioInfo, port: P, required: &[RequiredState]) -> Result<Self> {
        let mut scenario = Self::new(info, port);
        for entry in required {
            let name = Name::new(entry.name)?;
            let vector = LevenshteinVector::with_synonyms(name, entry.synonyms.iter().copied())?;
            let state = scenario.create_enter_state(vector.into(), true)?;
            if !entry.answer.is_empty() {
                scenario.set_answer(state.id, SourceText::new(entry.answer))?;
            }
        }
        tracing::debug!(
            scenario = %scenario.info.id,
            required = required.len(),
            "scenario bootstrapped"
        );
        Ok(scenario)
    }

    pub fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut ScenarioInfo {
        &mut self.info
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// Register `vector`, create a state named after it and bind the state as
    /// an entry.
    pub fn create_enter_state(&mut self, vector: InputDescription, required: bool) -> Result<State> {
        let name = vector.name().clone();
        if self.port.vector_exists(&name)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "vector `{name}` already exists"
            ))));
        }
        if let Some(other) = self.enter_state_named(&name, None)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "entry state {} is already named `{name}`",
                other.id
            ))));
        }

        self.port.add_vector(vector)?;
        let state = match self.port.create_state(StateAttrs::named(name.clone()), required) {
            Ok(state) => state,
            Err(err) => {
                self.undo(|port| port.remove_vector(&name));
                return Err(err);
            }
        };
        if let Err(err) = self.port.new_step(None, state.id, &name) {
            self.undo(|port| port.delete_state(state.id));
            self.undo(|port| port.remove_vector(&name));
            return Err(err);
        }

        tracing::debug!(state_id = %state.id, vector = %name, required, "entry state created");
        Ok(state)
    }

    /// Bind an existing state as an entry through a new vector.
    pub fn create_enter_vector(&mut self, vector: InputDescription, state_id: StateId) -> Result<Step> {
        let state = self.state(state_id)?;
        if let Some(other) = self.enter_state_named(&state.name, Some(state_id))? {
            return Err(reject(ScenarioError::Conflict(format!(
                "entry state {} is already named `{}`",
                other.id, state.name
            ))));
        }
        let name = vector.name().clone();
        if self.port.vector_exists(&name)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "vector `{name}` already exists"
            ))));
        }

        self.port.add_vector(vector)?;
        match self.port.new_step(None, state_id, &name) {
            Ok(step) => {
                tracing::debug!(state_id = %state_id, vector = %name, "entry vector created");
                Ok(step)
            }
            Err(err) => {
                self.undo(|port| port.remove_vector(&name));
                Err(err)
            }
        }
    }

    /// Bind a state as an entry through the already registered vector that
    /// carries the state's own name.
    pub fn make_enter(&mut self, state_id: StateId) -> Result<Step> {
        let state = self.state(state_id)?;
        if self.port.is_entry(state_id)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "state {state_id} is already an entry"
            ))));
        }
        self.bind_enter(state_id, &state.name)
    }

    /// Bind a state as an entry through any registered vector.
    ///
    /// This is the general form of [`Scenario::make_enter`]; importers use it
    /// to restore entry links whose vector name differs from the state name.
    pub fn bind_enter(&mut self, state_id: StateId, vector: &Name) -> Result<Step> {
        let state = self.state(state_id)?;
        self.require_vector(vector)?;
        if let Some(other) = self.enter_state_named(&state.name, Some(state_id))? {
            return Err(reject(ScenarioError::Conflict(format!(
                "entry state {} is already named `{}`",
                other.id, state.name
            ))));
        }
        if self.has_step(None, state_id, vector)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "state {state_id} is already an entry by `{vector}`"
            ))));
        }
        if let Some(owner) = self
            .input_usage(vector)?
            .into_iter()
            .find(|s| s.is_entry() && s.to != state_id)
        {
            return Err(reject(ScenarioError::Conflict(format!(
                "vector `{vector}` is already the entry of state {}",
                owner.to
            ))));
        }
        let step = self.port.new_step(None, state_id, vector)?;
        tracing::debug!(state_id = %state_id, vector = %vector, "entry bound");
        Ok(step)
    }

    /// Remove the entry connection of a state. Vectors stay registered.
    pub fn remove_enter(&mut self, state_id: StateId) -> Result<()> {
        let state = self.state(state_id)?;
        if state.required {
            return Err(reject(ScenarioError::Forbidden(format!(
                "state {state_id} (`{}`) is required and must stay an entry",
                state.name
            ))));
        }
        if !self.port.is_entry(state_id)? {
            return Err(reject(ScenarioError::NotFound(format!(
                "state {state_id} is not an entry"
            ))));
        }
        self.port.delete_step(None, Some(state_id), None)?;
        tracing::debug!(state_id = %state_id, "entry removed");
        Ok(())
    }

    // ========================================================================
    // Steps
    // ========================================================================

    pub fn create_step_between(&mut self, from: StateId, to: StateId, vector: &Name) -> Result<Step> {
        self.port.states(Some(&[from, to]))?;
        self.require_vector(vector)?;
        if self.has_step(Some(from), to, vector)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "step {from} -> {to} by `{vector}` already exists"
            ))));
        }
        let step = self.port.new_step(Some(from), to, vector)?;
        tracing::debug!(from = %from, to = %to, vector = %vector, "step created");
        Ok(step)
    }

    /// Create a new state and a step leading to it from `from`.
    ///
    /// The new state's name must not shadow an entry state name: those are
    /// reserved as unambiguous global commands.
    pub fn create_step_to_new_state(
        &mut self,
        from: StateId,
        attrs: StateAttrs,
        output: SourceText,
        vector: &Name,
    ) -> Result<Step> {
        self.state(from)?;
        self.require_vector(vector)?;
        if let Some(name) = &attrs.name {
            if let Some(other) = self.enter_state_named(name, None)? {
                return Err(reject(ScenarioError::Conflict(format!(
                    "name `{name}` is taken by entry state {}",
                    other.id
                ))));
            }
        }

        let state = self.port.create_state(attrs, false)?;
        let created = self
            .port
            .set_answer(state.id, output)
            .and_then(|()| self.port.new_step(Some(from), state.id, vector));
        match created {
            Ok(step) => {
                tracing::debug!(
                    from = %from,
                    to = %state.id,
                    vector = %vector,
                    "step to new state created"
                );
                Ok(step)
            }
            Err(err) => {
                self.undo(|port| port.delete_state(state.id));
                Err(err)
            }
        }
    }

    /// Remove the steps leaving `from` by `vector`.
    pub fn remove_step(&mut self, from: StateId, vector: &Name) -> Result<()> {
        self.port.delete_step(Some(from), None, Some(vector))?;
        tracing::debug!(from = %from, vector = %vector, "step removed");
        Ok(())
    }

    // ========================================================================
    // States
    // ========================================================================

    pub fn remove_state(&mut self, id: StateId) -> Result<()> {
        let state = self.state(id)?;
        if state.required {
            return Err(reject(ScenarioError::Forbidden(format!(
                "state {id} (`{}`) is required",
                state.name
            ))));
        }
        let touching = self.port.steps_touching(id)?;
        if !touching.is_empty() {
            return Err(reject(ScenarioError::Conflict(format!(
                "state {id} still has {} incident step(s)",
                touching.len()
            ))));
        }
        self.port.delete_state(id)?;
        tracing::debug!(state_id = %id, "state removed");
        Ok(())
    }

    pub fn rename_state(&mut self, id: StateId, new_name: Name) -> Result<()> {
        let state = self.state(id)?;
        if state.name == new_name {
            return Ok(());
        }
        if self.port.is_entry(id)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "state {id} is an entry; its name is a global command"
            ))));
        }
        if self.is_entry_bound(&new_name)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "`{new_name}` is bound to an entry"
            ))));
        }
        if let Some(other) = self.enter_state_named(&new_name, Some(id))? {
            return Err(reject(ScenarioError::Conflict(format!(
                "`{new_name}` is taken by entry state {}",
                other.id
            ))));
        }
        self.port.rename_state(id, new_name.clone())?;
        tracing::debug!(state_id = %id, name = %new_name, "state renamed");
        Ok(())
    }

    pub fn set_answer(&mut self, id: StateId, output: SourceText) -> Result<()> {
        self.port.set_answer(id, output)
    }

    pub fn set_description(&mut self, id: StateId, description: SourceText) -> Result<()> {
        self.port.set_description(id, description)
    }

    /// Insert a state with a `required` flag and answer taken from an
    /// external document. The flag can't be changed afterwards.
    pub fn restore_state(&mut self, attrs: StateAttrs, output: SourceText, required: bool) -> Result<State> {
        let mut state = self.port.create_state(attrs, required)?;
        if let Err(err) = self.port.set_answer(state.id, output.clone()) {
            self.undo(|port| port.delete_state(state.id));
            return Err(err);
        }
        state.output = output;
        Ok(state)
    }

    // ========================================================================
    // Vectors
    // ========================================================================

    pub fn add_vector(&mut self, vector: InputDescription) -> Result<()> {
        if self.port.vector_exists(vector.name())? {
            return Err(reject(ScenarioError::Conflict(format!(
                "vector `{}` already exists",
                vector.name()
            ))));
        }
        let name = vector.name().clone();
        self.port.add_vector(vector)?;
        tracing::debug!(vector = %name, "vector added");
        Ok(())
    }

    /// Replace the payload (e.g. synonyms) of an existing vector.
    pub fn update_vector(&mut self, vector: InputDescription) -> Result<()> {
        self.require_vector(vector.name())?;
        self.port.update_vector(vector)
    }

    pub fn remove_vector(&mut self, name: &Name) -> Result<()> {
        self.require_vector(name)?;
        let usage = self.input_usage(name)?;
        if !usage.is_empty() {
            return Err(reject(ScenarioError::Conflict(format!(
                "vector `{name}` is used by {} step(s)",
                usage.len()
            ))));
        }
        self.port.remove_vector(name)?;
        tracing::debug!(vector = %name, "vector removed");
        Ok(())
    }

    pub fn rename_vector(&mut self, old: &Name, new: Name) -> Result<()> {
        self.require_vector(old)?;
        if *old == new {
            return Ok(());
        }
        if self.input_usage(old)?.iter().any(Step::is_entry) {
            return Err(reject(ScenarioError::Conflict(format!(
                "vector `{old}` is bound to an entry"
            ))));
        }
        if self.port.vector_exists(&new)? {
            return Err(reject(ScenarioError::Conflict(format!(
                "vector `{new}` already exists"
            ))));
        }
        self.port.rename_vector(old, new.clone())?;
        tracing::debug!(old = %old, new = %new, "vector renamed");
        Ok(())
    }

    // ========================================================================
    // Read path
    // ========================================================================

    pub fn states(&self, ids: Option<&[StateId]>) -> Result<BTreeMap<StateId, State>> {
        self.port.states(ids)
    }

    pub fn state(&self, id: StateId) -> Result<State> {
        self.port
            .states(Some(&[id]))?
            .remove(&id)
            .ok_or_else(|| ScenarioError::NotFound(format!("state {id}")))
    }

    /// First state (lowest id) carrying `name`.
    pub fn find_state_by_name(&self, name: &str) -> Result<Option<State>> {
        Ok(self
            .port
            .states(None)?
            .into_values()
            .find(|s| s.name.as_str() == name.trim()))
    }

    /// Steps leaving `id`.
    pub fn steps_from(&self, id: StateId) -> Result<Vec<Step>> {
        self.state(id)?;
        Ok(self
            .port
            .connections()?
            .edges
            .remove(&id)
            .unwrap_or_default()
            .iter()
            .flat_map(|c| c.steps())
            .collect())
    }

    /// Vectors in registration order: all of them for `None`, otherwise the
    /// named ones, failing `NotFound` on the first missing name.
    pub fn select_vectors(&self, names: Option<&[Name]>) -> Result<Vec<InputDescription>> {
        match names {
            None => self.port.vectors(),
            Some(names) => names.iter().map(|n| self.port.get_vector(n)).collect(),
        }
    }

    pub fn is_entry(&self, id: StateId) -> Result<bool> {
        self.port.is_entry(id)
    }

    /// Every step referencing the vector `name`.
    pub fn input_usage(&self, name: &Name) -> Result<Vec<Step>> {
        Ok(self
            .port
            .connections()?
            .steps()
            .filter(|s| s.vector == *name)
            .collect())
    }

    /// Entry states, ordered by id.
    pub fn enter_states(&self) -> Result<Vec<State>> {
        let ids: Vec<StateId> = self.port.connections()?.entries.into_keys().collect();
        Ok(self.port.states(Some(&ids))?.into_values().collect())
    }

    pub fn connections(&self) -> Result<Connections> {
        self.port.connections()
    }

    // ========================================================================
    // Classification candidates
    // ========================================================================

    /// Steps leaving `id`, as candidates ordered by vector registration.
    pub fn contextual_candidates(&self, id: StateId) -> Result<Vec<Candidate>> {
        let steps = self.steps_from(id)?;
        self.candidates(steps)
    }

    /// Entry steps, as candidates ordered by vector registration.
    pub fn global_candidates(&self) -> Result<Vec<Candidate>> {
        let steps: Vec<Step> = self
            .port
            .connections()?
            .entries
            .values()
            .flat_map(|c| c.steps())
            .collect();
        self.candidates(steps)
    }

    fn candidates(&self, steps: Vec<Step>) -> Result<Vec<Candidate>> {
        let vectors = self.port.vectors()?;
        let order: HashMap<&Name, usize> = vectors
            .iter()
            .enumerate()
            .map(|(idx, v)| (v.name(), idx))
            .collect();

        let mut ranked: Vec<(usize, Candidate)> = Vec::with_capacity(steps.len());
        for step in steps {
            let idx = *order.get(&step.vector).ok_or_else(|| {
                ScenarioError::NotFound(format!(
                    "vector `{}` of step {} -> {}",
                    step.vector,
                    display_source(step.from),
                    step.to
                ))
            })?;
            ranked.push((
                idx,
                Candidate {
                    vector: vectors[idx].clone(),
                    target: step.to,
                },
            ));
        }
        ranked.sort_by_key(|(idx, _)| *idx);
        Ok(ranked.into_iter().map(|(_, c)| c).collect())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require_vector(&self, name: &Name) -> Result<()> {
        if self.port.vector_exists(name)? {
            Ok(())
        } else {
            Err(reject(ScenarioError::NotFound(format!("vector `{name}`"))))
        }
    }

    fn has_step(&self, from: Option<StateId>, to: StateId, vector: &Name) -> Result<bool> {
        let connections = self.port.connections()?;
        let connection = match from {
            None => connections.entries.get(&to),
            Some(from) => connections
                .edges
                .get(&from)
                .and_then(|cs| cs.iter().find(|c| c.to == to)),
        };
        Ok(connection.map_or(false, |c| c.vectors.contains(vector)))
    }

    /// An entry state named `name`, other than `except`.
    fn enter_state_named(&self, name: &Name, except: Option<StateId>) -> Result<Option<State>> {
        Ok(self
            .enter_states()?
            .into_iter()
            .find(|s| s.name == *name && Some(s.id) != except))
    }

    fn is_entry_bound(&self, name: &Name) -> Result<bool> {
        Ok(self
            .port
            .connections()?
            .entries
            .values()
            .any(|c| c.vectors.contains(name)))
    }

    /// Best-effort rollback; the original error is what the caller sees.
    fn undo(&mut self, f: impl FnOnce(&mut P) -> Result<()>) {
        if let Err(err) = f(&mut self.port) {
            tracing::warn!(error = %err, "rollback after failed mutation did not complete");
        }
    }
}

fn reject(err: ScenarioError) -> ScenarioError {
    tracing::debug!(error = %err, "scenario mutation rejected");
    err
}
