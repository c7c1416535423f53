// 🎮 Game Account - one member of the in-game guild roster
//
// Name format is "<handle>.<4-digit-suffix>", e.g. "Test.1234".
// The handle is the join key against the community roster.

use crate::matching;
use crate::temporal::JoinedAt;
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW MEMBER (guild API shape)
// ============================================================================

/// Member record as the guild-management API lists it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMember {
    pub name: String,
    pub rank: String,

    /// ISO-8601 date-time; the API reports null for some legacy members
    #[serde(default)]
    pub joined: Option<String>,
}

impl GameMember {
    pub fn new(name: impl Into<String>, rank: impl Into<String>, joined: impl Into<String>) -> Self {
        GameMember {
            name: name.into(),
            rank: rank.into(),
            joined: Some(joined.into()),
        }
    }
}

// ============================================================================
// GAME ACCOUNT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAccount {
    pub name: String,
    pub rank: String,
    pub joined_at: JoinedAt,
}

impl GameAccount {
    pub fn new(name: impl Into<String>, rank: impl Into<String>, joined_at: JoinedAt) -> Self {
        GameAccount {
            name: name.into(),
            rank: rank.into(),
            joined_at,
        }
    }

    /// Lower-cased name before the first '.'
    pub fn handle(&self) -> String {
        matching::handle(&self.name)
    }

    pub fn has_rank(&self, rank: &str) -> bool {
        self.rank == rank
    }
}

impl From<GameMember> for GameAccount {
    fn from(member: GameMember) -> Self {
        let joined_at = member
            .joined
            .as_deref()
            .map(JoinedAt::from_iso)
            .unwrap_or_default();

        GameAccount {
            name: member.name,
            rank: member.rank,
            joined_at,
        }
    }
}
