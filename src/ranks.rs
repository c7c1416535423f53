// 🎖️ Rank Table - Explicit precedence for ranks and roles
//
// Every comparison between ranks (game) or roles (community) goes through a
// RankTable value built once per run. Nothing is global: two runs for two
// communities never share a table.
//
//   lower ordinal  = higher precedence = sorts first
//   unknown names  = one shared fallback ordinal, after every known rank

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

/// Role for visitors with no guild affiliation
pub const GUEST_ROLE: &str = "Guest";

/// Role for automated community accounts
pub const BOTS_ROLE: &str = "Bots";

// ============================================================================
// RANK ENTRY
// ============================================================================

/// One valid rank as supplied by the guild's rank listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub id: String,
    pub order: i64,
}

impl RankEntry {
    pub fn new(id: impl Into<String>, order: i64) -> Self {
        RankEntry {
            id: id.into(),
            order,
        }
    }
}

// ============================================================================
// RANK TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct RankTable {
    /// Entries in precedence order (stable for equal orders)
    entries: Vec<RankEntry>,

    /// Lookup by rank id, widened so `max + 1` can't overflow
    ordinals: HashMap<String, i128>,

    /// Ordinal for any name not in the table
    fallback: i128,
}

impl RankTable {
    /// Build the table from the guild's rank listing.
    ///
    /// `Guest` and `Bots` are appended below every listed rank when the
    /// listing doesn't already contain them. If an id appears more than once
    /// the first occurrence wins.
    pub fn new(entries: Vec<RankEntry>) -> Self {
        let mut ordinals: HashMap<String, i128> = HashMap::new();
        let mut kept: Vec<RankEntry> = Vec::with_capacity(entries.len() + 2);

        for entry in entries {
            if ordinals.contains_key(&entry.id) {
                warn!(rank = %entry.id, "duplicate rank in listing, keeping first");
                continue;
            }
            ordinals.insert(entry.id.clone(), i128::from(entry.order));
            kept.push(entry);
        }

        // Vec::sort_by_key is stable: equal orders keep listing order
        kept.sort_by_key(|entry| entry.order);

        for synthetic in [GUEST_ROLE, BOTS_ROLE] {
            if !ordinals.contains_key(synthetic) {
                let ordinal = max_ordinal(&ordinals) + 1;
                ordinals.insert(synthetic.to_string(), ordinal);
                // listed order saturates at i64::MAX; precedence uses the ordinal
                let order = i64::try_from(ordinal).unwrap_or(i64::MAX);
                kept.push(RankEntry::new(synthetic, order));
            }
        }

        let fallback = max_ordinal(&ordinals) + 1;

        RankTable {
            entries: kept,
            ordinals,
            fallback,
        }
    }

    /// Ordinal for a rank name; missing or unknown names get the fallback
    pub fn ordinal(&self, name: Option<&str>) -> i128 {
        name.and_then(|n| self.ordinals.get(n).copied())
            .unwrap_or(self.fallback)
    }

    /// Compare two rank names by precedence
    pub fn compare(&self, a: Option<&str>, b: Option<&str>) -> Ordering {
        self.ordinal(a).cmp(&self.ordinal(b))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ordinals.contains_key(name)
    }

    pub fn fallback_ordinal(&self) -> i128 {
        self.fallback
    }

    /// Known ranks, highest precedence first
    pub fn ranks(&self) -> impl Iterator<Item = &RankEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn max_ordinal(ordinals: &HashMap<String, i128>) -> i128 {
    ordinals.values().copied().max().unwrap_or(0)
}

// ============================================================================
// TESTS
// ============================================================================
