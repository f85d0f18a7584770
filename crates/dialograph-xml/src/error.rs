use dialograph_core::{ScenarioError, StateId};
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] AttrError),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("rendered document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("malformed scenario document: {0}")]
    Malformed(String),

    #[error("document references unknown state id {0}")]
    UnknownState(StateId),

    #[error("unsupported vector type `{0}`")]
    UnsupportedVector(String),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

pub type Result<T, E = DocumentError> = std::result::Result<T, E>;
