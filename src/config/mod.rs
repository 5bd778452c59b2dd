use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::filter::Period;
use crate::scope::ScopePolicy;

/// Report defaults from the `[reports]` block.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ReportsConfig {
    /// Period applied when a report request names none.
    pub default_period: String,
    /// Monthly target shown when a branch has none stored.
    pub default_sales_target: f64,
    /// Window of the daily sales trend, in days.
    pub trend_days: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        ReportsConfig {
            default_period: "month".to_string(),
            default_sales_target: 10000.0,
            trend_days: 7,
        }
    }
}

impl ReportsConfig {
    pub fn default_period(&self) -> Period {
        Period::from_tag(&self.default_period)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EventsConfig {
    /// Role allowed to add calendar events.
    pub editor_role: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        EventsConfig {
            editor_role: "head_of_department".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    /// Role allowed to publish, edit and delete posts and stories.
    pub editor_role: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            editor_role: "head_of_department".to_string(),
        }
    }
}

/// Top-level branchdesk config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(default)]
pub struct DeskConfig {
    pub scope: ScopePolicy,
    pub reports: ReportsConfig,
    pub events: EventsConfig,
    pub feed: FeedConfig,
}

impl DeskConfig {
    /// Load config from `path` (or ~/.branchdesk/config.toml). Returns default if the file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };
        if !path.exists() {
            return Ok(DeskConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render the effective config as TOML.
    pub fn display(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Path to the config file: ~/.branchdesk/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".branchdesk").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.branchdesk/config.toml

[scope]
# When true, branch-scoped commands fail without --branch / --owner.
require_branch = true
# Used when require_branch = false and no branch is given.
# default_branch = 1

[reports]
# today, week (Monday-Sunday), month, year, custom, none
default_period = "month"
default_sales_target = 10000.0
trend_days = 7

[events]
editor_role = "head_of_department"

[feed]
editor_role = "head_of_department"
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config(path: Option<&Path>) -> Result<bool> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}
