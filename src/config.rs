// ⚙️ Configuration - reconciliation policy as data
//
// The guild-specific rank names the engine treats specially live here rather
// than in the engine code. Everything has a default, so an empty file (or no
// file at all) gives the standard policy.
//
//   [policy]
//   alt_rank = "Alt"
//   promotion_rank = "Second Spear"
//   promotion_after_days = 14
//   ignored_community_roles = ["Bots", "Guest"]

use crate::ranks::{BOTS_ROLE, GUEST_ROLE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_ALT_RANK: &str = "Alt";
pub const DEFAULT_PROMOTION_RANK: &str = "Second Spear";
pub const DEFAULT_PROMOTION_AFTER_DAYS: u32 = 14;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// POLICY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePolicy {
    /// Game rank for secondary characters; never expected in the community
    #[serde(default = "default_alt_rank")]
    pub alt_rank: String,

    /// Game rank of members waiting for their first promotion
    #[serde(default = "default_promotion_rank")]
    pub promotion_rank: String,

    /// Whole days after joining before a promotion is due
    #[serde(default = "default_promotion_after_days")]
    pub promotion_after_days: u32,

    /// Primary roles whose extra community accounts are not worth reporting
    #[serde(default = "default_ignored_community_roles")]
    pub ignored_community_roles: Vec<String>,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        ReconcilePolicy {
            alt_rank: default_alt_rank(),
            promotion_rank: default_promotion_rank(),
            promotion_after_days: default_promotion_after_days(),
            ignored_community_roles: default_ignored_community_roles(),
        }
    }
}

impl ReconcilePolicy {
    pub fn is_alt(&self, rank: &str) -> bool {
        rank == self.alt_rank
    }

    pub fn is_ignored_community_role(&self, role: Option<&str>) -> bool {
        role.is_some_and(|r| self.ignored_community_roles.iter().any(|ignored| ignored == r))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.alt_rank.trim().is_empty() {
            return Err(ConfigError::Invalid("policy.alt_rank must not be empty".into()));
        }
        if self.promotion_rank.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "policy.promotion_rank must not be empty".into(),
            ));
        }
        if self.ignored_community_roles.iter().any(|r| r.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "policy.ignored_community_roles must not contain empty names".into(),
            ));
        }
        Ok(())
    }
}

fn default_alt_rank() -> String {
    DEFAULT_ALT_RANK.to_owned()
}

fn default_promotion_rank() -> String {
    DEFAULT_PROMOTION_RANK.to_owned()
}

fn default_promotion_after_days() -> u32 {
    DEFAULT_PROMOTION_AFTER_DAYS
}

fn default_ignored_community_roles() -> Vec<String> {
    vec![BOTS_ROLE.to_owned(), GUEST_ROLE.to_owned()]
}

// ============================================================================
// CONFIG FILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub policy: ReconcilePolicy,
}

impl ReconcileConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ReconcileConfig = toml::from_str(raw)?;
        config.policy.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(ReconcileConfig::default()),
        }
    }
}
