use std::{collections::HashMap, fs, path::Path, time::Duration};

use shared::domain::Environment;
use tracing::warn;

use crate::bootstrap::DEFAULT_SPLASH_DELAY;

pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    pub production: String,
    pub staging: String,
    pub development: String,
}

impl Default for Domains {
    fn default() -> Self {
        Self {
            production: String::new(),
            staging: String::new(),
            development: "localhost:8000".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub environment: Environment,
    pub domains: Domains,
    pub splash_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            domains: Domains::default(),
            splash_delay_ms: DEFAULT_SPLASH_DELAY.as_millis() as u64,
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn base_url(&self) -> String {
        resolve_base_url(self.environment, &self.domains)
    }

    pub fn splash_delay(&self) -> Duration {
        Duration::from_millis(self.splash_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Production and staging are served over TLS; every other environment falls
/// back to plain http against the development domain.
pub fn resolve_base_url(environment: Environment, domains: &Domains) -> String {
    let domain = match environment {
        Environment::Production => &domains.production,
        Environment::Staging => &domains.staging,
        Environment::Development => &domains.development,
    };
    let scheme = if environment.uses_tls() { "https" } else { "http" };
    format!("{scheme}://{domain}")
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Layers defaults, then the flat `key = "value"` table at `path` if it
/// exists, then variables returned by `var`. Both `APP_X` and `APP__X`
/// spellings are accepted; the latter wins.
pub fn load_settings_from(path: &Path, var: impl Fn(&str) -> Option<String>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("env") {
                    settings.environment = Environment::from_tag(v);
                }
                if let Some(v) = file_cfg.get("domain_prod") {
                    settings.domains.production = v.clone();
                }
                if let Some(v) = file_cfg.get("domain_stag") {
                    settings.domains.staging = v.clone();
                }
                if let Some(v) = file_cfg.get("domain_dev") {
                    settings.domains.development = v.clone();
                }
                if let Some(v) = file_cfg.get("splash_delay_ms") {
                    apply_number(&mut settings.splash_delay_ms, "splash_delay_ms", v);
                }
                if let Some(v) = file_cfg.get("request_timeout_secs") {
                    apply_number(&mut settings.request_timeout_secs, "request_timeout_secs", v);
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring malformed settings file"),
        }
    }

    let lookup = |name: &str| {
        var(&format!("APP__{name}")).or_else(|| var(&format!("APP_{name}")))
    };

    if let Some(v) = lookup("ENV") {
        settings.environment = Environment::from_tag(&v);
    }
    if let Some(v) = lookup("DOMAIN_PROD") {
        settings.domains.production = v;
    }
    if let Some(v) = lookup("DOMAIN_STAG") {
        settings.domains.staging = v;
    }
    if let Some(v) = lookup("DOMAIN_DEV") {
        settings.domains.development = v;
    }
    if let Some(v) = lookup("SPLASH_DELAY_MS") {
        apply_number(&mut settings.splash_delay_ms, "APP_SPLASH_DELAY_MS", &v);
    }
    if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
        apply_number(&mut settings.request_timeout_secs, "APP_REQUEST_TIMEOUT_SECS", &v);
    }

    settings
}

fn apply_number(target: &mut u64, key: &str, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(parsed) => *target = parsed,
        Err(_) => warn!(key, value = raw, "ignoring non-numeric setting"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
