//! Ledger configuration.

use std::time::Duration;

use anchorchain_core::Difficulty;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Configuration for the Ledger.
///
/// Deserializable so a host can load it from its own config source; any
/// field left out takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Required digest prefix for new blocks. `null` disables mining.
    pub difficulty: Difficulty,

    /// Upper bound (inclusive) for the randomized starting nonce.
    pub max_start_nonce: u64,

    /// Deadline for each individual storage call.
    pub storage_timeout: Duration,

    /// Cap on nonce attempts per block. `None` searches until found or
    /// cancelled.
    pub max_pow_iterations: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            max_start_nonce: i32::MAX as u64,
            storage_timeout: Duration::from_secs(30),
            max_pow_iterations: None,
        }
    }
}

impl LedgerConfig {
    /// Set the proof-of-work difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Disable proof-of-work.
    pub fn without_pow(self) -> Self {
        self.with_difficulty(Difficulty::none())
    }

    /// Set the storage call deadline.
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Cap nonce attempts per block.
    pub fn with_max_pow_iterations(mut self, max: u64) -> Self {
        self.max_pow_iterations = Some(max);
        self
    }

    /// Reject settings the ledger cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.difficulty
            .validate()
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        if self.storage_timeout.is_zero() {
            return Err(LedgerError::InvalidConfig(
                "storage_timeout must be non-zero".into(),
            ));
        }
        if self.max_pow_iterations == Some(0) {
            return Err(LedgerError::InvalidConfig(
                "max_pow_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.difficulty.as_prefix(), Some("00"));
        assert_eq!(config.max_start_nonce, 2_147_483_647);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_null_prefix_disables_mining() {
        let config: LedgerConfig = serde_json::from_str(r#"{"difficulty": null}"#).unwrap();
        assert!(config.difficulty.is_disabled());
        assert_eq!(config.storage_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_deserialized_prefix_is_validated() {
        let config: LedgerConfig = serde_json::from_str(r#"{"difficulty": "zz"}"#).unwrap();
        assert!(matches!(config.validate(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let config = LedgerConfig::default().with_storage_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = LedgerConfig::default().with_max_pow_iterations(0);
        assert!(config.validate().is_err());
    }
}
