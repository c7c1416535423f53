// 💬 Community Account - one member of the chat-community roster
//
// Platform members carry every role the server hands out (cosmetic, pings,
// content roles...). Only roles that are also guild ranks take part in
// reconciliation, so they are filtered once at ingestion into `role_tags`,
// keeping the platform's role order.

use crate::ranks::RankTable;
use crate::temporal::JoinedAt;
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW MEMBER (chat platform shape)
// ============================================================================

/// Member record as the chat platform lists it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMember {
    pub display_name: String,

    /// Role names in platform order
    #[serde(default)]
    pub roles: Vec<String>,

    /// Epoch milliseconds
    #[serde(default)]
    pub joined_timestamp: Option<i64>,
}

impl CommunityMember {
    pub fn new(display_name: impl Into<String>, roles: &[&str], joined_timestamp: i64) -> Self {
        CommunityMember {
            display_name: display_name.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            joined_timestamp: Some(joined_timestamp),
        }
    }

    /// Keep only the roles the rank table knows about
    pub fn normalize(self, ranks: &RankTable) -> CommunityAccount {
        let role_tags = self
            .roles
            .into_iter()
            .filter(|role| ranks.contains(role))
            .collect();

        let joined_at = self
            .joined_timestamp
            .map(JoinedAt::from_epoch_millis)
            .unwrap_or_default();

        CommunityAccount {
            display_name: self.display_name,
            role_tags,
            joined_at,
        }
    }
}

// ============================================================================
// COMMUNITY ACCOUNT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityAccount {
    pub display_name: String,

    /// Rank roles only, platform order
    pub role_tags: Vec<String>,

    pub joined_at: JoinedAt,
}

impl CommunityAccount {
    pub fn new(display_name: impl Into<String>, role_tags: &[&str], joined_at: JoinedAt) -> Self {
        CommunityAccount {
            display_name: display_name.into(),
            role_tags: role_tags.iter().map(|r| r.to_string()).collect(),
            joined_at,
        }
    }

    /// First role tag, the one the member is ranked by
    pub fn primary_role(&self) -> Option<&str> {
        self.role_tags.first().map(String::as_str)
    }

    pub fn has_no_role(&self) -> bool {
        self.role_tags.is_empty()
    }

    pub fn has_multiple_roles(&self) -> bool {
        self.role_tags.len() > 1
    }

    /// The single role, when there is exactly one
    pub fn sole_role(&self) -> Option<&str> {
        match self.role_tags.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}
