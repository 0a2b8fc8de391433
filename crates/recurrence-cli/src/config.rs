//! Configuration loading.
//!
//! Sources, later ones overriding earlier ones: built-in defaults,
//! `~/.config/recur/config.toml`, the file passed with `--config`, and
//! `RECUR_*` environment variables.

use std::path::{Path, PathBuf};

use chrono::Weekday;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Occurrence length when a series gives neither `--dtend` nor `--duration`.
    pub default_duration_minutes: u32,
    /// First day of the week for weekly usage buckets.
    pub first_day_of_week: Weekday,
    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration_minutes: 30,
            first_day_of_week: Weekday::Mon,
            pretty_json: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally merging a specific file.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("RECUR_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for recur.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("recur"))
}
