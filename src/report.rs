// 📝 Action Report - discrepancies an administrator has to act on
//
// Computing discrepancies (ReconciliationEngine) and presenting them (here)
// are separate steps. This module turns a DiscrepancySet into an ordered list
// of `{key, entries}` records, one per non-empty category, always in the
// same category order:
//
//   1. Extra Game Accounts
//   2. Extra Community Accounts   (Bots / Guest not counted)
//   3. Has No Role
//   4. Has Multiple Roles
//   5. Mismatched Roles
//   6. Needs Promotion

use crate::config::ReconcilePolicy;
use crate::entities::{CommunityAccount, GameAccount};
use crate::ranks::RankTable;
use crate::reconciliation::{DiscrepancySet, ReconciliationEngine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::info;

/// Shown for community accounts without any rank role
pub const NO_ROLE_LABEL: &str = "No Role";

// ============================================================================
// DISCREPANCY CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscrepancyCategory {
    ExtraGameAccounts,
    ExtraCommunityAccounts,
    HasNoRole,
    HasMultipleRoles,
    MismatchedRoles,
    NeedsPromotion,
}

impl DiscrepancyCategory {
    /// Report order
    pub const ALL: [DiscrepancyCategory; 6] = [
        DiscrepancyCategory::ExtraGameAccounts,
        DiscrepancyCategory::ExtraCommunityAccounts,
        DiscrepancyCategory::HasNoRole,
        DiscrepancyCategory::HasMultipleRoles,
        DiscrepancyCategory::MismatchedRoles,
        DiscrepancyCategory::NeedsPromotion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DiscrepancyCategory::ExtraGameAccounts => "Extra Game Accounts",
            DiscrepancyCategory::ExtraCommunityAccounts => "Extra Community Accounts",
            DiscrepancyCategory::HasNoRole => "Has No Role",
            DiscrepancyCategory::HasMultipleRoles => "Has Multiple Roles",
            DiscrepancyCategory::MismatchedRoles => "Mismatched Roles",
            DiscrepancyCategory::NeedsPromotion => "Needs Promotion",
        }
    }
}

impl fmt::Display for DiscrepancyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// DISCREPANCY RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyRecord {
    /// Category label
    pub key: String,
    pub entries: Vec<String>,
}

// ============================================================================
// ENTRY FORMATTING
// ============================================================================

pub fn format_game_account(account: &GameAccount) -> String {
    account.name.clone()
}

/// `"<name> (<primary role or 'No Role'>)"`
pub fn format_excess_community(account: &CommunityAccount) -> String {
    format!(
        "{} ({})",
        account.display_name,
        account.primary_role().unwrap_or(NO_ROLE_LABEL)
    )
}

/// `"<name> (<role1, role2, ...>)"`
pub fn format_multiple_roles(account: &CommunityAccount) -> String {
    format!("{} ({})", account.display_name, account.role_tags.join(", "))
}

// ============================================================================
// ACTION REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionReport {
    records: Vec<DiscrepancyRecord>,
}

impl ActionReport {
    /// Format a run's discrepancies into report records
    pub fn assemble(set: &DiscrepancySet<'_>, policy: &ReconcilePolicy) -> Self {
        let mut report = ActionReport::default();

        report.push(
            DiscrepancyCategory::ExtraGameAccounts,
            set.excess_game.iter().map(|a| format_game_account(a)),
        );
        report.push(
            DiscrepancyCategory::ExtraCommunityAccounts,
            set.excess_community
                .iter()
                .filter(|a| !policy.is_ignored_community_role(a.primary_role()))
                .map(|a| format_excess_community(a)),
        );
        report.push(
            DiscrepancyCategory::HasNoRole,
            set.no_role.iter().map(|a| a.display_name.clone()),
        );
        report.push(
            DiscrepancyCategory::HasMultipleRoles,
            set.multiple_roles.iter().map(|a| format_multiple_roles(a)),
        );
        report.push(
            DiscrepancyCategory::MismatchedRoles,
            set.mismatched_roles.iter().map(|m| m.to_string()),
        );
        report.push(
            DiscrepancyCategory::NeedsPromotion,
            set.needs_promotion.iter().map(|a| format_game_account(a)),
        );

        info!(
            categories = report.records.len(),
            entries = report.total_entries(),
            "action report assembled"
        );

        report
    }

    fn push(&mut self, category: DiscrepancyCategory, entries: impl Iterator<Item = String>) {
        let entries: Vec<String> = entries.collect();
        if !entries.is_empty() {
            self.records.push(DiscrepancyRecord {
                key: category.label().to_string(),
                entries,
            });
        }
    }

    pub fn records(&self) -> &[DiscrepancyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DiscrepancyRecord> {
        self.records
    }

    pub fn get(&self, category: DiscrepancyCategory) -> Option<&DiscrepancyRecord> {
        self.records.iter().find(|r| r.key == category.label())
    }

    /// Nothing to act on
    pub fn is_clean(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.records.iter().map(|r| r.entries.len()).sum()
    }

    /// SHA-256 over keys and entries, in order.
    ///
    /// Identical inputs give identical fingerprints, so a scheduled notifier
    /// can skip reposting a report that hasn't changed.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update(record.key.as_bytes());
            hasher.update([0x1e]);
            for entry in &record.entries {
                hasher.update(entry.as_bytes());
                hasher.update([0x1f]);
            }
            hasher.update([0x1d]);
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn summary(&self) -> String {
        if self.is_clean() {
            return "Rosters in sync: no actions required".to_string();
        }

        let parts: Vec<String> = self
            .records
            .iter()
            .map(|r| format!("{} {}", r.entries.len(), r.key))
            .collect();
        format!(
            "{} actions required: {}",
            self.total_entries(),
            parts.join(", ")
        )
    }
}

/// One-shot reconciliation: default policy, evaluated as of now
pub fn build_report(
    game: &[GameAccount],
    community: &[CommunityAccount],
    ranks: &RankTable,
) -> Vec<DiscrepancyRecord> {
    ReconciliationEngine::new(game, community, ranks.clone())
        .report()
        .into_records()
}

// ============================================================================
// TESTS
// ============================================================================
