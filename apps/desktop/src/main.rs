use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ApiClient, BootstrapSequencer, Intent, SessionMiddleware, SessionStore,
    TracingMiddleware,
};
use shared::domain::Environment;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod surface;

use surface::{apply, parse_command, SurfaceOutcome};

#[derive(Parser, Debug)]
struct Args {
    /// Overrides APP_ENV (production, staging, anything else is development).
    #[arg(long)]
    env: Option<String>,
    /// Overrides the domain for the selected environment.
    #[arg(long)]
    domain: Option<String>,
    #[arg(long)]
    splash_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(env) = args.env.as_deref() {
        settings.environment = Environment::from_tag(env);
    }
    if let Some(domain) = args.domain {
        match settings.environment {
            Environment::Production => settings.domains.production = domain,
            Environment::Staging => settings.domains.staging = domain,
            Environment::Development => settings.domains.development = domain,
        }
    }
    if let Some(splash_ms) = args.splash_ms {
        settings.splash_delay_ms = splash_ms;
    }

    let api = ApiClient::from_settings(&settings).context("failed to configure API client")?;
    info!(
        environment = %settings.environment,
        base_url = %api.base_url(),
        "client configured"
    );

    let store = SessionStore::new_with_middleware(vec![
        Arc::new(TracingMiddleware) as Arc<dyn SessionMiddleware>
    ]);

    let bootstrap = BootstrapSequencer::start(settings.splash_delay());
    println!("Loading...");
    if !bootstrap.wait_ready().await {
        warn!("bootstrap cancelled before the login surface was shown");
        return Ok(());
    }
    drop(bootstrap);

    run_login_surface(&store).await
}

async fn run_login_surface(store: &SessionStore) -> Result<()> {
    println!("Login ready. Commands: login <name>, logout, state, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match apply(store, command) {
            SurfaceOutcome::State(state) => println!("{}", serde_json::to_string(&state)?),
            SurfaceOutcome::Quit => break,
        }
    }

    // session scope ends with the process
    store.dispatch(Intent::LoggedOut);
    Ok(())
}
