//! # Protocol Configuration
//!
//! Loaded from YAML, then overridden from the environment:
//!
//! | Variable               | Field               |
//! |------------------------|---------------------|
//! | `ZKT_KEY_BITS`         | `key_bits`          |
//! | `ZKT_PROVE_TIMEOUT_MS` | `prove_timeout_ms`  |
//! | `ZKT_STALE_RETRIES`    | `max_stale_retries` |
//!
//! `key_bits` is capped at 126 so that `n^2` stays below the BN254 scalar
//! field modulus and every ciphertext is a single public signal. It starts
//! at 66 so that `n` exceeds every `u64` amount and no value reduces
//! modulo `n`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkt_crypto::MIN_ACCOUNT_KEY_BITS;
use zkt_ledger::LedgerConfig;

/// Largest modulus size whose square fits in a BN254 scalar.
pub const MAX_KEY_BITS: u64 = 126;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing configuration: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Orchestrator and ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Paillier modulus size for newly generated account keys.
    pub key_bits: u64,
    /// Upper bound on a single proof generation.
    pub prove_timeout_ms: u64,
    /// How many times a transfer is re-proved after `StaleBalance`.
    pub max_stale_retries: u32,
    pub ledger: LedgerConfig,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            key_bits: 96,
            prove_timeout_ms: 30_000,
            max_stale_retries: 2,
            ledger: LedgerConfig::default(),
        }
    }
}

impl ProtocolConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a YAML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.apply_overrides(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_overrides(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("ZKT_KEY_BITS") {
            self.key_bits = parse_number("key_bits", &v)?;
        }
        if let Some(v) = lookup("ZKT_PROVE_TIMEOUT_MS") {
            self.prove_timeout_ms = parse_number("prove_timeout_ms", &v)?;
        }
        if let Some(v) = lookup("ZKT_STALE_RETRIES") {
            self.max_stale_retries = parse_number("max_stale_retries", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_bits % 2 != 0 || !(MIN_ACCOUNT_KEY_BITS..=MAX_KEY_BITS).contains(&self.key_bits) {
            return Err(ConfigError::Invalid {
                field: "key_bits",
                reason: format!(
                    "must be even and within {MIN_ACCOUNT_KEY_BITS}..={MAX_KEY_BITS}, got {}",
                    self.key_bits
                ),
            });
        }
        if self.prove_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "prove_timeout_ms",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn prove_timeout(&self) -> Duration {
        Duration::from_millis(self.prove_timeout_ms)
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        field,
        reason: format!("{raw:?}: {e}"),
    })
}
