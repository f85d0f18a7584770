//! Map-backed [`ScenarioPort`] living for the lifetime of the process.

use std::collections::BTreeMap;

use crate::error::{Result, ScenarioError};
use crate::ids::{Name, SourceText, StateId};
use crate::model::{Connection, Connections, InputDescription, State, StateAttrs, Step};
use crate::port::ScenarioPort;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPort {
    next_id: u64,
    states: BTreeMap<StateId, State>,
    /// Registration order is significant: classification ties go to the
    /// first-registered vector.
    vectors: Vec<InputDescription>,
    /// Creation order.
    connections: Vec<Connection>,
}

impl InMemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut State> {
        self.states
            .get_mut(&id)
            .ok_or_else(|| ScenarioError::NotFound(format!("state {id}")))
    }

    fn vector_position(&self, name: &Name) -> Option<usize> {
        self.vectors.iter().position(|v| v.name() == name)
    }
}

impl ScenarioPort for InMemoryPort {
    fn create_state(&mut self, attrs: StateAttrs, required: bool) -> Result<State> {
        self.next_id += 1;
        let id = StateId::new(self.next_id);
        let state = State {
            id,
            name: attrs.resolved_name(id),
            description: attrs.description,
            output: SourceText::default(),
            required,
        };
        self.states.insert(id, state.clone());
        Ok(state)
    }

    fn delete_state(&mut self, id: StateId) -> Result<()> {
        self.states
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ScenarioError::NotFound(format!("state {id}")))
    }

    fn states(&self, ids: Option<&[StateId]>) -> Result<BTreeMap<StateId, State>> {
        let Some(ids) = ids else {
            return Ok(self.states.clone());
        };
        let mut out = BTreeMap::new();
        for id in ids {
            let state = self
                .states
                .get(id)
                .ok_or_else(|| ScenarioError::NotFound(format!("state {id}")))?;
            out.insert(*id, state.clone());
        }
        Ok(out)
    }

    fn steps_touching(&self, id: StateId) -> Result<Vec<Step>> {
        Ok(self
            .connections
            .iter()
            .filter(|c| c.touches(id))
            .flat_map(Connection::steps)
            .collect())
    }

    fn is_entry(&self, id: StateId) -> Result<bool> {
        Ok(self
            .connections
            .iter()
            .any(|c| c.from.is_none() && c.to == id))
    }

    fn set_answer(&mut self, id: StateId, output: SourceText) -> Result<()> {
        self.state_mut(id)?.output = output;
        Ok(())
    }

    fn set_description(&mut self, id: StateId, description: SourceText) -> Result<()> {
        self.state_mut(id)?.description = description;
        Ok(())
    }

    fn rename_state(&mut self, id: StateId, name: Name) -> Result<()> {
        self.state_mut(id)?.name = name;
        Ok(())
    }

    fn add_vector(&mut self, vector: InputDescription) -> Result<()> {
        if self.vector_position(vector.name()).is_some() {
            return Err(ScenarioError::Conflict(format!(
                "vector `{}` already exists",
                vector.name()
            )));
        }
        self.vectors.push(vector);
        Ok(())
    }

    fn remove_vector(&mut self, name: &Name) -> Result<()> {
        let idx = self
            .vector_position(name)
            .ok_or_else(|| ScenarioError::NotFound(format!("vector `{name}`")))?;
        self.vectors.remove(idx);
        Ok(())
    }

    fn get_vector(&self, name: &Name) -> Result<InputDescription> {
        self.vector_position(name)
            .map(|idx| self.vectors[idx].clone())
            .ok_or_else(|| ScenarioError::NotFound(format!("vector `{name}`")))
    }

    fn vector_exists(&self, name: &Name) -> Result<bool> {
        Ok(self.vector_position(name).is_some())
    }

    fn update_vector(&mut self, vector: InputDescription) -> Result<()> {
        let idx = self
            .vector_position(vector.name())
            .ok_or_else(|| ScenarioError::NotFound(format!("vector `{}`", vector.name())))?;
        self.vectors[idx] = vector;
        Ok(())
    }

    fn vectors(&self) -> Result<Vec<InputDescription>> {
        Ok(self.vectors.clone())
    }

    fn rename_vector(&mut self, old: &Name, new: Name) -> Result<()> {
        let idx = self
            .vector_position(old)
            .ok_or_else(|| ScenarioError::NotFound(format!("vector `{old}`")))?;
        let vector = self.vectors[idx].clone().renamed(new.clone());
        self.vectors[idx] = vector;
        for connection in &mut self.connections {
            for vector in &mut connection.vectors {
                if vector == old {
                    *vector = new.clone();
                }
            }
        }
        Ok(())
    }

    fn new_step(&mut self, from: Option<StateId>, to: StateId, vector: &Name) -> Result<Step> {
        let step = Step {
            from,
            to,
            vector: vector.clone(),
        };
        match self
            .connections
            .iter_mut()
            .find(|c| c.from == from && c.to == to)
        {
            Some(connection) => {
                if connection.vectors.contains(vector) {
                    return Err(ScenarioError::Conflict(format!(
                        "step {} -> {to} by `{vector}` already exists",
                        display_source(from)
                    )));
                }
                connection.vectors.push(vector.clone());
            }
            None => self.connections.push(Connection {
                from,
                to,
                vectors: vec![vector.clone()],
            }),
        }
        Ok(step)
    }

    fn delete_step(
        &mut self,
        from: Option<StateId>,
        to: Option<StateId>,
        vector: Option<&Name>,
    ) -> Result<()> {
        let mut removed = 0usize;
        for connection in &mut self.connections {
            if connection.from != from || to.map_or(false, |to| connection.to != to) {
                continue;
            }
            let before = connection.vectors.len();
            connection
                .vectors
                .retain(|v| vector.map_or(false, |wanted| v != wanted));
            removed += before - connection.vectors.len();
        }
        self.connections.retain(|c| !c.vectors.is_empty());

        if removed == 0 {
            return Err(ScenarioError::NotFound(format!(
                "step from {} to {} by {}",
                display_source(from),
                to.map_or_else(|| "any".to_string(), |t| t.to_string()),
                vector.map_or_else(|| "any vector".to_string(), |v| format!("`{v}`"))
            )));
        }
        Ok(())
    }

    fn connections(&self) -> Result<Connections> {
        let mut out = Connections::default();
        for connection in &self.connections {
            match connection.from {
                None => {
                    out.entries.insert(connection.to, connection.clone());
                }
                Some(from) => out.edges.entry(from).or_default().push(connection.clone()),
            }
        }
        Ok(out)
    }
}

pub(crate) fn display_source(from: Option<StateId>) -> String {
    match from {
        Some(id) => id.to_string(),
        None => "entry".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LevenshteinVector;

    fn name(s: &str) -> Name {
        Name::new(s).unwrap()
    }

    fn vector(s: &str) -> InputDescription {
        LevenshteinVector::new(name(s)).into()
    }

    #[test]
    fn test_ids_are_assigned_and_blank_names_default_to_id() {
        let mut port = InMemoryPort::new();
        let a = port.create_state(StateAttrs::default(), false).unwrap();
        let b = port
            .create_state(StateAttrs::named(name("Помощь")), true)
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.name.as_str(), a.id.to_string());
        assert!(b.required);
    }

    #[test]
    fn test_states_fails_on_missing_id() {
        let mut port = InMemoryPort::new();
        let a = port.create_state(StateAttrs::default(), false).unwrap();
        let err = port
            .states(Some(&[a.id, StateId::new(999)]))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::NotFound(_)));
    }

    #[test]
    fn test_steps_into_same_pair_share_a_connection() {
        let mut port = InMemoryPort::new();
        let a = port.create_state(StateAttrs::default(), false).unwrap();
        let b = port.create_state(StateAttrs::default(), false).unwrap();
        port.add_vector(vector("x")).unwrap();
        port.add_vector(vector("y")).unwrap();
        port.new_step(Some(a.id), b.id, &name("x")).unwrap();
        port.new_step(Some(a.id), b.id, &name("y")).unwrap();
        assert!(port.new_step(Some(a.id), b.id, &name("x")).is_err());

        let connections = port.connections().unwrap();
        assert_eq!(connections.edges[&a.id].len(), 1);
        assert_eq!(connections.edges[&a.id][0].vectors, [name("x"), name("y")]);
        assert_eq!(port.steps_touching(b.id).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_step_drops_empty_connections() {
        let mut port = InMemoryPort::new();
        let a = port.create_state(StateAttrs::default(), false).unwrap();
        port.add_vector(vector("a")).unwrap();
        port.new_step(None, a.id, &name("a")).unwrap();
        assert!(port.is_entry(a.id).unwrap());

        port.delete_step(None, Some(a.id), None).unwrap();
        assert!(!port.is_entry(a.id).unwrap());
        assert!(port.connections().unwrap().entries.is_empty());
        assert!(matches!(
            port.delete_step(None, Some(a.id), None),
            Err(ScenarioError::NotFound(_))
        ));
    }

    #[test]
    fn test_rename_vector_rewrites_step_references() {
        let mut port = InMemoryPort::new();
        let a = port.create_state(StateAttrs::default(), false).unwrap();
        let b = port.create_state(StateAttrs::default(), false).unwrap();
        port.add_vector(vector("old")).unwrap();
        port.new_step(Some(a.id), b.id, &name("old")).unwrap();
        port.rename_vector(&name("old"), name("new")).unwrap();

        assert!(!port.vector_exists(&name("old")).unwrap());
        assert_eq!(port.get_vector(&name("new")).unwrap().name(), "new");
        assert_eq!(port.steps_touching(a.id).unwrap()[0].vector, "new");
    }
}
