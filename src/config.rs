//! Engine configuration, read from the environment.

use serde::Serialize;

use crate::{EngineError, Result};

pub const DEFAULT_MAX_COMBINATIONS: usize = 1000;
pub const DEFAULT_PORT: u16 = 8083;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Upper bound on generated combinations per regeneration.
    pub max_combinations: usize,
    /// Reconcile a persisted matrix as soon as dimensions load in edit mode.
    pub reconcile_on_load: bool,
    pub port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_combinations: DEFAULT_MAX_COMBINATIONS, reconcile_on_load: false, port: DEFAULT_PORT }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup("VARIANT_MAX_COMBINATIONS") {
            config.max_combinations = raw.trim().parse()
                .map_err(|e| EngineError::Config(format!("VARIANT_MAX_COMBINATIONS={raw}: {e}")))?;
            if config.max_combinations == 0 {
                return Err(EngineError::Config("VARIANT_MAX_COMBINATIONS must be at least 1".into()));
            }
        }
        if let Some(raw) = lookup("VARIANT_RECONCILE_ON_LOAD") {
            config.reconcile_on_load = parse_bool(&raw)
                .ok_or_else(|| EngineError::Config(format!("VARIANT_RECONCILE_ON_LOAD={raw}: expected a boolean")))?;
        }
        if let Some(raw) = lookup("PORT") {
            config.port = raw.trim().parse().map_err(|e| EngineError::Config(format!("PORT={raw}: {e}")))?;
        }
        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
