use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{domain::UserData, protocol::Intent};
use tokio::sync::watch;
use tracing::{debug, info};

/// Which of the three observable shapes a [`SessionState`] is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Pending,
    Resolved,
}

/// Only the idle, pending and resolved shapes can be built or decoded; a
/// state carrying data while still loading is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionState")]
pub struct SessionState {
    data: Option<UserData>,
    is_loading: bool,
}

#[derive(Deserialize)]
struct RawSessionState {
    #[serde(default)]
    data: Option<UserData>,
    #[serde(default)]
    is_loading: bool,
}

impl TryFrom<RawSessionState> for SessionState {
    type Error = String;

    fn try_from(raw: RawSessionState) -> Result<Self, Self::Error> {
        match (raw.data, raw.is_loading) {
            (Some(_), true) => Err("session state cannot carry data while loading".to_string()),
            (Some(data), false) => Ok(Self::resolved(data)),
            (None, true) => Ok(Self::pending()),
            (None, false) => Ok(Self::idle()),
        }
    }
}

impl SessionState {
    pub fn idle() -> Self {
        Self::default()
    }

    fn pending() -> Self {
        Self {
            is_loading: true,
            ..Self::idle()
        }
    }

    /// A JSON `null` payload carries no user, so it resolves to the idle shape.
    fn resolved(data: UserData) -> Self {
        Self {
            data: (!data.0.is_null()).then_some(data),
            is_loading: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.data, self.is_loading) {
            (Some(_), _) => SessionPhase::Resolved,
            (None, true) => SessionPhase::Pending,
            (None, false) => SessionPhase::Idle,
        }
    }

    pub fn user(&self) -> Option<&UserData> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

/// Computes the next session state. The result depends only on the intent;
/// unrecognized intents return the current state unchanged.
pub fn reduce(state: &SessionState, intent: Intent) -> SessionState {
    match intent {
        Intent::LoggingIn => SessionState::pending(),
        Intent::LoggedIn(data) => SessionState::resolved(data),
        Intent::LoggedOut => SessionState::idle(),
        Intent::Unrecognized(_) => state.clone(),
    }
}

/// Observes dispatches after the reducer ran. Middleware cannot alter the
/// resulting state.
///
/// Dispatches from one task reach middleware in order. Dispatches racing on
/// cloned handles are reduced one at a time, but their `after_dispatch` calls
/// run outside the state lock and may arrive in a different order.
pub trait SessionMiddleware: Send + Sync {
    fn after_dispatch(&self, intent: &Intent, previous: &SessionState, next: &SessionState);
}

pub struct TracingMiddleware;

impl SessionMiddleware for TracingMiddleware {
    fn after_dispatch(&self, intent: &Intent, previous: &SessionState, next: &SessionState) {
        if previous == next {
            debug!(intent = intent.kind(), "session intent left state unchanged");
            return;
        }
        info!(
            intent = intent.kind(),
            from = ?previous.phase(),
            to = ?next.phase(),
            "session state changed"
        );
    }
}

/// Handle to the single session state value. Clones share the same state;
/// construct one at startup and pass it to whoever dispatches or observes.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
    middleware: Arc<[Arc<dyn SessionMiddleware>]>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::new_with_middleware(Vec::new())
    }

    pub fn new_with_middleware(middleware: Vec<Arc<dyn SessionMiddleware>>) -> Self {
        let (state, _) = watch::channel(SessionState::idle());
        Self {
            state: Arc::new(state),
            middleware: middleware.into(),
        }
    }

    /// Applies `intent` and returns the new state. Dispatches are serialized;
    /// observers are only woken when the state actually changed.
    pub fn dispatch(&self, intent: Intent) -> SessionState {
        let mut previous = SessionState::idle();
        let mut next = SessionState::idle();
        let reduced_intent = intent.clone();

        self.state.send_if_modified(|current| {
            previous = current.clone();
            next = reduce(current, reduced_intent);
            if next == *current {
                return false;
            }
            *current = next.clone();
            true
        });

        for middleware in self.middleware.iter() {
            middleware.after_dispatch(&intent, &previous, &next);
        }
        next
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
