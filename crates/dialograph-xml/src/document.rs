//! In-memory form of a scenario document.
//!
//! A [`ScenarioDocument`] is a flat, storage-independent snapshot of a
//! scenario: vectors with their synonyms, states, entry bindings and
//! transitions grouped by source state. State ids inside a document are
//! document-local; [`ScenarioDocument::into_scenario`] assigns fresh ids
//! through the target port and reports the mapping.

use std::collections::{BTreeMap, BTreeSet};

use dialograph_core::{
    InputDescription, Name, Scenario, ScenarioInfo, ScenarioPort, SourceText, StateAttrs, StateId,
};

use crate::error::{DocumentError, Result};

/// Document id → id assigned on import.
pub type IdRemap = BTreeMap<StateId, StateId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState {
    pub id: StateId,
    pub name: Name,
    pub description: SourceText,
    pub output: SourceText,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub state: StateId,
    pub vector: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStep {
    pub to: StateId,
    pub vector: Name,
}

/// All steps leaving one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTransition {
    pub from: StateId,
    pub steps: Vec<DocumentStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioDocument {
    pub info: ScenarioInfo,
    pub vectors: Vec<InputDescription>,
    pub states: Vec<DocumentState>,
    pub entries: Vec<DocumentEntry>,
    pub transitions: Vec<DocumentTransition>,
}

/// A scenario rebuilt from a document.
pub struct Imported<P: ScenarioPort> {
    pub scenario: Scenario<P>,
    pub id_remap: IdRemap,
}

impl ScenarioDocument {
    /// Snapshot the full content of `scenario`.
    pub fn from_scenario<P: ScenarioPort>(scenario: &Scenario<P>) -> Result<Self> {
        let vectors = scenario.select_vectors(None)?;
        let states = scenario
            .states(None)?
            .into_values()
            .map(|s| DocumentState {
                id: s.id,
                name: s.name,
                description: s.description,
                output: s.output,
                required: s.required,
            })
            .collect();

        let connections = scenario.connections()?;
        let entries = connections
            .entries
            .values()
            .flat_map(|c| c.steps())
            .map(|step| DocumentEntry {
                state: step.to,
                vector: step.vector,
            })
            .collect();
        let transitions = connections
            .edges
            .iter()
            .map(|(from, outgoing)| DocumentTransition {
                from: *from,
                steps: outgoing
                    .iter()
                    .flat_map(|c| c.steps())
                    .map(|step| DocumentStep {
                        to: step.to,
                        vector: step.vector,
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            info: scenario.info().clone(),
            vectors,
            states,
            entries,
            transitions,
        })
    }

    /// Rebuild the document into an empty `port`.
    ///
    /// Goes through the scenario aggregate, so a document that violates a
    /// graph invariant is rejected with the corresponding scenario error.
    pub fn into_scenario<P: ScenarioPort>(self, port: P) -> Result<Imported<P>> {
        self.check_references()?;

        let mut scenario = Scenario::new(self.info, port);
        for vector in self.vectors {
            scenario.add_vector(vector)?;
        }

        let mut id_remap = IdRemap::new();
        for state in self.states {
            let attrs = StateAttrs::named(state.name).with_description(state.description);
            let created = scenario.restore_state(attrs, state.output, state.required)?;
            id_remap.insert(state.id, created.id);
        }

        for entry in &self.entries {
            scenario.bind_enter(id_remap[&entry.state], &entry.vector)?;
        }
        for transition in &self.transitions {
            let from = id_remap[&transition.from];
            for step in &transition.steps {
                scenario.create_step_between(from, id_remap[&step.to], &step.vector)?;
            }
        }

        tracing::debug!(
            states = id_remap.len(),
            entries = self.entries.len(),
            transitions = self.transitions.len(),
            "scenario document imported"
        );
        Ok(Imported { scenario, id_remap })
    }

    /// Every id used by entries and transitions must name a document state.
    fn check_references(&self) -> Result<()> {
        let mut known = BTreeSet::new();
        for state in &self.states {
            if !known.insert(state.id) {
                return Err(DocumentError::Malformed(format!(
                    "state id {} appears twice",
                    state.id
                )));
            }
        }
        let referenced = self
            .entries
            .iter()
            .map(|e| e.state)
            .chain(self.transitions.iter().flat_map(|t| {
                std::iter::once(t.from).chain(t.steps.iter().map(|s| s.to))
            }));
        for id in referenced {
            if !known.contains(&id) {
                return Err(DocumentError::UnknownState(id));
            }
        }
        Ok(())
    }
}
