//! Wire shapes of the serverless handler.

use dialograph_core::StateId;
use serde::{Deserialize, Serialize};

/// `{ "text": ..., "session": { "state": 3 } }`; `session` and `state`
/// may be absent on the first turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub session: Session,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillResponse {
    pub text: String,
    /// State to send back with the next request.
    pub session: Session,
}

impl SkillRequest {
    pub fn new(text: impl Into<String>, state: Option<StateId>) -> Self {
        Self {
            text: text.into(),
            session: Session { state },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_turn_request_parses_without_session() {
        let request: SkillRequest = serde_json::from_str(r#"{"text": ""}"#).unwrap();
        assert_eq!(request.session.state, None);

        let request: SkillRequest =
            serde_json::from_str(r#"{"text": "помощь", "session": {"state": 4}}"#).unwrap();
        assert_eq!(request, SkillRequest::new("помощь", Some(StateId::new(4))));
    }

    #[test]
    fn test_response_carries_session_state() {
        let response = SkillResponse {
            text: "Привет!".into(),
            session: Session {
                state: Some(StateId::new(1)),
            },
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"text":"Привет!","session":{"state":1}}"#
        );
    }
}
