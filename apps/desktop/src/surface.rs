//! Console login surface: turns typed commands into session intents.

use client_core::{Intent, SessionState, SessionStore};
use serde_json::json;
use shared::domain::UserData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    Login { name: String },
    Logout,
    ShowState,
    Quit,
}

pub enum SurfaceOutcome {
    State(SessionState),
    Quit,
}

pub fn parse_command(line: &str) -> Result<SurfaceCommand, String> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("login"), Some(name)) => Ok(SurfaceCommand::Login {
            name: name.to_string(),
        }),
        (Some("login"), None) => Err("usage: login <name>".to_string()),
        (Some("logout"), None) => Ok(SurfaceCommand::Logout),
        (Some("state"), None) => Ok(SurfaceCommand::ShowState),
        (Some("quit" | "exit"), None) => Ok(SurfaceCommand::Quit),
        _ => Err(format!(
            "unknown command '{}'; expected login <name>, logout, state or quit",
            line.trim()
        )),
    }
}

/// The surface only signals the session lifecycle; credentials are never
/// checked here.
pub fn apply(store: &SessionStore, command: SurfaceCommand) -> SurfaceOutcome {
    match command {
        SurfaceCommand::Login { name } => {
            store.dispatch(Intent::LoggingIn);
            SurfaceOutcome::State(store.dispatch(Intent::LoggedIn(UserData::new(
                json!({ "name": name }),
            ))))
        }
        SurfaceCommand::Logout => SurfaceOutcome::State(store.dispatch(Intent::LoggedOut)),
        SurfaceCommand::ShowState => SurfaceOutcome::State(store.state()),
        SurfaceCommand::Quit => SurfaceOutcome::Quit,
    }
}
