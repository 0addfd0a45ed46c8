//! Client-side session core: the session store and its reducer, the startup
//! bootstrap sequencer, settings loading and the API client factory.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use bootstrap::{BootstrapSequencer, DEFAULT_SPLASH_DELAY};
pub use config::{load_settings, resolve_base_url, ClientSettings, Domains};
pub use error::ClientError;
pub use http::ApiClient;
pub use session::{
    reduce, SessionMiddleware, SessionPhase, SessionState, SessionStore, TracingMiddleware,
};
pub use shared::protocol::Intent;
