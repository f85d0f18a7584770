//! Error taxonomy shared by the scenario aggregate, the persistence port and
//! the classifier.

use thiserror::Error;

/// Coarse error classification, for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    NoMatch,
    Invalid,
    Backend,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// An id or name is absent from the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Name collision, duplicate entry or duplicate step.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Deleting or unbinding a required state.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The classifier found no candidate under its acceptance threshold.
    #[error("no match for input `{0}`")]
    NoMatch(String),

    /// A value type rejected its input (blank name, empty synonym, bad id).
    #[error("invalid value: {0}")]
    Invalid(String),

    /// Transport failure inside a storage adapter, passed through untranslated.
    #[error("storage backend failure")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ScenarioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScenarioError::NotFound(_) => ErrorKind::NotFound,
            ScenarioError::Conflict(_) => ErrorKind::Conflict,
            ScenarioError::Forbidden(_) => ErrorKind::Forbidden,
            ScenarioError::NoMatch(_) => ErrorKind::NoMatch,
            ScenarioError::Invalid(_) => ErrorKind::Invalid,
            ScenarioError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Wrap an adapter error without translating it into a domain kind.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ScenarioError::Backend(Box::new(err))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, ScenarioError::NoMatch(_))
    }
}

pub type Result<T, E = ScenarioError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_variant() {
        assert_eq!(
            ScenarioError::Conflict("x".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ScenarioError::NoMatch("дщпщ".into()).kind(),
            ErrorKind::NoMatch
        );
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection lost");
        let err = ScenarioError::backend(io);
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(std::error::Error::source(&err).is_some());
    }
}
