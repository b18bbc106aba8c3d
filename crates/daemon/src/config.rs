// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Rollout Contributors

//! Daemon-wide configuration, loaded from a TOML file the way the CLI's
//! runbook layer parses its own TOML documents.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_freshness_window_secs() -> u64 {
    300
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./rollout-logs")
}

/// Daemon-wide configuration.
///
/// `freshness_window_secs` backs the `rollout_async` staleness gate: a
/// rollout refuses to start once more than this many seconds have elapsed
/// since `generate_tasks_dt`, defaulting to 300 (5 minutes).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "freshness_window_secs")]
    freshness_window_secs: u64,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self { freshness_window_secs: default_freshness_window_secs(), log_dir: default_log_dir() }
    }
}

impl Config {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    /// Parse a `Config` from a TOML document, falling back to defaults for
    /// any field the document omits.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load from `ROLLOUT_CONFIG` if set, else from `path` if it exists,
    /// else the built-in defaults. Environment variable takes priority over
    /// the file on disk.
    pub fn load(path: &std::path::Path) -> Self {
        if let Ok(inline) = std::env::var("ROLLOUT_CONFIG") {
            if let Ok(cfg) = Self::from_toml(&inline) {
                return cfg;
            }
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
