//! One conversation turn per request.
//!
//! The handler holds a scenario but no session: the current state id
//! arrives with each request and leaves with the response. A fresh
//! [`Engine`] is built for every turn and dropped afterwards.

use std::io::{BufRead, Write};

use anyhow::{anyhow, Context};
use dialograph_core::{Engine, ErrorKind, InMemoryPort, Scenario, State};
use dialograph_xml::import_scenario;

use crate::config::RuntimeConfig;
use crate::request::{Session, SkillRequest, SkillResponse};

pub struct Handler {
    config: RuntimeConfig,
    scenario: Scenario<InMemoryPort>,
}

impl Handler {
    pub fn new(config: RuntimeConfig, scenario: Scenario<InMemoryPort>) -> Self {
        Self { config, scenario }
    }

    /// Load the scenario document named by `config.scenario_path`.
    pub fn load(config: RuntimeConfig) -> anyhow::Result<Self> {
        let path = &config.scenario_path;
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let imported = import_scenario(&xml, InMemoryPort::new())
            .with_context(|| format!("importing scenario {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            states = imported.id_remap.len(),
            "scenario loaded"
        );
        Ok(Self::new(config, imported.scenario))
    }

    pub fn scenario(&self) -> &Scenario<InMemoryPort> {
        &self.scenario
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn handle(&self, request: &SkillRequest) -> anyhow::Result<SkillResponse> {
        let current = match request.session.state {
            None => return self.first_turn(),
            Some(id) => match self.scenario.state(id) {
                Ok(state) => state,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::warn!(state_id = %id, "unknown session state, restarting");
                    return self.first_turn();
                }
                Err(err) => return Err(err.into()),
            },
        };

        let mut engine = Engine::new(&self.scenario, self.config.classifier.classifier(), current)
            .with_not_understood(self.config.not_understood.as_str());
        let response = engine.handle(&request.text)?;
        Ok(SkillResponse {
            text: response.text,
            session: Session {
                state: Some(engine.current_state().id),
            },
        })
    }

    /// Answer of the start state, found by its reserved name.
    fn first_turn(&self) -> anyhow::Result<SkillResponse> {
        let start = self.start_state()?;
        tracing::debug!(state_id = %start.id, name = %start.name, "first turn");
        Ok(SkillResponse {
            text: start.output.into_string(),
            session: Session {
                state: Some(start.id),
            },
        })
    }

    /// Entry states win over plain states sharing a reserved name.
    fn start_state(&self) -> anyhow::Result<State> {
        let entries = self.scenario.enter_states()?;
        for name in &self.config.start_state_names {
            if let Some(state) = entries.iter().find(|s| s.name.as_str() == name.trim()) {
                return Ok(state.clone());
            }
        }
        for name in &self.config.start_state_names {
            if let Some(state) = self.scenario.find_state_by_name(name)? {
                return Ok(state);
            }
        }
        Err(anyhow!(
            "scenario has no start state named any of {:?}",
            self.config.start_state_names
        ))
    }
}

/// Load the scenario and answer a single request.
pub fn handle_once(config: &RuntimeConfig, request: &SkillRequest) -> anyhow::Result<SkillResponse> {
    Handler::load(config.clone())?.handle(request)
}

/// Answer one JSON request per input line with one JSON response line.
///
/// A line that fails to parse or to resolve is logged and skipped; only
/// I/O failures on the streams stop the loop. Returns the number of
/// skipped lines.
pub fn serve<R: BufRead, W: Write>(config: &RuntimeConfig, input: R, mut output: W) -> anyhow::Result<usize> {
    let mut failed = 0;
    for (idx, line) in input.lines().enumerate() {
        let line = line.context("reading request")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = serde_json::from_str::<SkillRequest>(&line)
            .context("parsing request")
            .and_then(|request| handle_once(config, &request));
        match response {
            Ok(response) => {
                serde_json::to_writer(&mut output, &response)?;
                writeln!(output)?;
                output.flush()?;
            }
            Err(err) => {
                failed += 1;
                tracing::error!(line = idx + 1, request = %line, error = %format!("{err:#}"), "request failed");
            }
        }
    }
    Ok(failed)
}
