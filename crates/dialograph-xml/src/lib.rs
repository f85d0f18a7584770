//! # dialograph-xml
//!
//! XML documents for dialograph scenarios.
//!
//! ```text
//! Scenario ──export_scenario──▶ <Сценарий> ──import_scenario──▶ Scenario + IdRemap
//! ```
//!
//! A document holds the scenario metadata and four sections:
//! `<Управляющие_воздействия>` (vectors and their synonyms), `<Состояния>`,
//! `<Входы>` (entry bindings) and `<Переходы>` (steps grouped by source).
//! Export followed by import yields an isomorphic scenario: the same state
//! names, answers, descriptions and required flags, the same vectors, and
//! the same entry and step structure. State ids are reassigned by the
//! target port; the returned [`IdRemap`] maps document ids to new ones.

mod document;
mod error;
mod read;
mod tags;
mod write;

#[cfg(test)]
mod tests;

pub use document::{
    DocumentEntry, DocumentState, DocumentStep, DocumentTransition, IdRemap, Imported,
    ScenarioDocument,
};
pub use error::DocumentError;
pub use read::read_document;
pub use write::write_document;

use dialograph_core::{Scenario, ScenarioPort};

/// Render the full content of `scenario` as an XML document.
pub fn export_scenario<P: ScenarioPort>(scenario: &Scenario<P>) -> Result<String, DocumentError> {
    let doc = ScenarioDocument::from_scenario(scenario)?;
    let xml = write_document(&doc)?;
    tracing::debug!(
        scenario = %doc.info.id,
        states = doc.states.len(),
        vectors = doc.vectors.len(),
        "scenario exported"
    );
    Ok(xml)
}

/// Rebuild a scenario from `xml` into the empty `port`.
pub fn import_scenario<P: ScenarioPort>(xml: &str, port: P) -> Result<Imported<P>, DocumentError> {
    read_document(xml)?.into_scenario(port)
}
