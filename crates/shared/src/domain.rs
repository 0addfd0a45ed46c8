use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user payload delivered by the login flow. The session core never
/// inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserData(pub serde_json::Value);

impl UserData {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    Staging,
    #[default]
    Development,
}

impl Environment {
    /// Any tag other than `production` or `staging` selects development.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            _ => Self::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
        }
    }

    pub fn uses_tls(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
