// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collector configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DevsignalError, Result};

/// Paths historically associated with `su` binaries and superuser packages.
pub const DEFAULT_SU_PATHS: &[&str] = &[
    "/system/app/Superuser.apk",
    "/sbin/su",
    "/system/bin/su",
    "/system/xbin/su",
    "/data/local/xbin/su",
    "/data/local/bin/su",
    "/system/sd/xbin/su",
    "/system/bin/failsafe/su",
    "/data/local/su",
    "/su/bin/su",
];

/// Settings for the signal collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Files whose existence marks the device as compromised.
    pub su_paths: Vec<String>,
    /// Whether to run the shell lookup for an `su` binary at all.
    pub su_lookup_enabled: bool,
    /// Program used for the lookup (default `which`).
    pub su_lookup_program: String,
    /// Arguments passed to the lookup program.
    pub su_lookup_args: Vec<String>,
    /// Upper bound on how long the lookup may block.
    pub su_lookup_timeout_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            su_paths: DEFAULT_SU_PATHS.iter().map(|p| (*p).to_owned()).collect(),
            su_lookup_enabled: true,
            su_lookup_program: "which".into(),
            su_lookup_args: vec!["su".into()],
            su_lookup_timeout_ms: 2_000,
        }
    }
}

impl CollectorConfig {
    /// Lookup timeout as a [`Duration`].
    pub fn su_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.su_lookup_timeout_ms)
    }

    /// Load a JSON config file. Missing keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the lookup meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.su_lookup_enabled && self.su_lookup_program.trim().is_empty() {
            return Err(DevsignalError::Config(
                "su_lookup_program must not be empty when the lookup is enabled".into(),
            ));
        }
        if self.su_lookup_timeout_ms == 0 {
            return Err(DevsignalError::Config(
                "su_lookup_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_known_paths() {
        let config = CollectorConfig::default();
        assert_eq!(config.su_paths.len(), 10);
        assert!(config.su_paths.iter().any(|p| p == "/system/xbin/su"));
        assert_eq!(config.su_lookup_program, "which");
        assert_eq!(config.su_lookup_args, vec!["su".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CollectorConfig =
            serde_json::from_str(r#"{ "su_lookup_timeout_ms": 500 }"#).unwrap();
        assert_eq!(config.su_lookup_timeout(), Duration::from_millis(500));
        assert!(config.su_lookup_enabled);
        assert_eq!(config.su_paths.len(), 10);
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = CollectorConfig {
            su_lookup_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DevsignalError::Config(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devsignal.json");
        std::fs::write(&path, r#"{ "su_lookup_enabled": false, "su_paths": ["/x/su"] }"#).unwrap();

        let config = CollectorConfig::load(&path).unwrap();
        assert!(!config.su_lookup_enabled);
        assert_eq!(config.su_paths, vec!["/x/su".to_string()]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CollectorConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(DevsignalError::Io(_))));
    }

    #[test]
    fn empty_program_only_rejected_when_enabled() {
        let mut config = CollectorConfig {
            su_lookup_program: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.su_lookup_enabled = false;
        assert!(config.validate().is_ok());
    }
}
