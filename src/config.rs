//! Runtime configuration read from the environment (and `.env`, when present).

use crate::api::ClientSettings;
use crate::controller::{ControllerConfig, StaleEnrichment};
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientSettings,
    pub controller: ControllerConfig,
    /// Page through everything instead of stopping after page 1
    pub load_all: bool,
    pub snapshot_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            controller: ControllerConfig::default(),
            load_all: false,
            snapshot_path: PathBuf::from("properties_snapshot.json"),
        }
    }
}

impl Settings {
    /// Load `.env` if it exists, then read settings from the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(url) = vars.get("PROPERTY_API_URL") {
            settings.client.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = vars.get("PROPERTY_API_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("PROPERTY_API_TIMEOUT_SECS is not a number: {raw}"))?;
            settings.client.timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = vars.get("PROPERTY_API_USER_AGENT") {
            settings.client.user_agent = agent.clone();
        }
        if let Some(raw) = vars.get("PROPERTY_STALE_ENRICHMENT") {
            settings.controller.stale_enrichment = raw
                .parse::<StaleEnrichment>()
                .map_err(|e| anyhow!(e))
                .context("Invalid PROPERTY_STALE_ENRICHMENT")?;
        }
        if let Some(raw) = vars.get("PROPERTY_LOAD_ALL") {
            settings.load_all = parse_flag(raw)
                .with_context(|| format!("PROPERTY_LOAD_ALL must be true or false, got {raw}"))?;
        }
        if let Some(path) = vars.get("PROPERTY_SNAPSHOT_PATH") {
            settings.snapshot_path = PathBuf::from(path);
        }

        Ok(settings)
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("unrecognised flag value")),
    }
}
