// Roster Reconcile - Core Library
// Game guild roster ↔ chat community roster reconciliation
//
// Pure engine (ranks, matching, roster, reconciliation, report) plus the
// file-based ingestion and config the CLI is built on.

pub mod temporal;       // Join times
pub mod ranks;          // Rank precedence table
pub mod matching;       // Handle ↔ display name matching
pub mod entities;       // Game and community accounts
pub mod roster;         // Rank-then-seniority sorting
pub mod reconciliation; // Discrepancy computations
pub mod report;         // Action report assembly
pub mod config;         // Policy configuration (TOML)
pub mod ingest;         // Roster files → engine input

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use temporal::JoinedAt;
pub use ranks::{RankEntry, RankTable, BOTS_ROLE, GUEST_ROLE};
pub use matching::{handle, matches, normalize_display_name, HandleMatcher};
pub use entities::{CommunityAccount, CommunityMember, GameAccount, GameMember};
pub use roster::{sort_community_roster, sort_game_roster};
pub use reconciliation::{DiscrepancySet, ReconciliationEngine, RoleMismatch};
pub use report::{build_report, ActionReport, DiscrepancyCategory, DiscrepancyRecord};
pub use config::{ConfigError, ReconcileConfig, ReconcilePolicy};
pub use ingest::{RosterFormat, RosterInputs};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
