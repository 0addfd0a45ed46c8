use serde::{Deserialize, Serialize};

use crate::domain::UserData;

pub const USER_LOGGING_IN: &str = "USER_LOGGING_IN";
pub const USER_LOGGED_IN: &str = "USER_LOGGED_IN";
pub const USER_LOGGED_OUT: &str = "USER_LOGGED_OUT";

/// A request to change session state.
///
/// On the wire an intent is `{"type": "...", "payload": ...}`. Unknown type
/// strings decode into [`Intent::Unrecognized`] instead of failing, so intents
/// coming from newer producers are ignored by the reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawIntent", into = "RawIntent")]
pub enum Intent {
    LoggingIn,
    LoggedIn(UserData),
    LoggedOut,
    Unrecognized(String),
}

impl Intent {
    pub fn kind(&self) -> &str {
        match self {
            Self::LoggingIn => USER_LOGGING_IN,
            Self::LoggedIn(_) => USER_LOGGED_IN,
            Self::LoggedOut => USER_LOGGED_OUT,
            Self::Unrecognized(kind) => kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawIntent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<serde_json::Value>,
}

impl From<RawIntent> for Intent {
    fn from(raw: RawIntent) -> Self {
        match raw.kind.as_str() {
            USER_LOGGING_IN => Self::LoggingIn,
            USER_LOGGED_IN => Self::LoggedIn(UserData(
                raw.payload.unwrap_or(serde_json::Value::Null),
            )),
            USER_LOGGED_OUT => Self::LoggedOut,
            _ => Self::Unrecognized(raw.kind),
        }
    }
}

impl From<Intent> for RawIntent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::LoggedIn(data) => Self {
                kind: USER_LOGGED_IN.to_string(),
                payload: Some(data.0),
            },
            other => Self {
                kind: other.kind().to_string(),
                payload: None,
            },
        }
    }
}
