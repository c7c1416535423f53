// 📋 Roster Sorting - rank first, then seniority
//
//   primary:   rank precedence (RankTable)   game: rank, community: primary role
//   secondary: join time ascending           unknown join = oldest
//
// Both sorts are stable and return new vectors; the input is untouched.

use crate::entities::{CommunityAccount, GameAccount};
use crate::ranks::RankTable;
use std::cmp::Ordering;

/// Sort game accounts by rank, then by join time
pub fn sort_game_roster(accounts: &[GameAccount], ranks: &RankTable) -> Vec<GameAccount> {
    let mut sorted = accounts.to_vec();
    sorted.sort_by(|a, b| compare_game(ranks, a, b));
    sorted
}

/// Sort community accounts by primary role, then by join time
pub fn sort_community_roster(
    accounts: &[CommunityAccount],
    ranks: &RankTable,
) -> Vec<CommunityAccount> {
    let mut sorted = accounts.to_vec();
    sorted.sort_by(|a, b| compare_community(ranks, a, b));
    sorted
}

pub fn compare_game(ranks: &RankTable, a: &GameAccount, b: &GameAccount) -> Ordering {
    ranks
        .compare(Some(&a.rank), Some(&b.rank))
        .then_with(|| a.joined_at.cmp(&b.joined_at))
}

pub fn compare_community(ranks: &RankTable, a: &CommunityAccount, b: &CommunityAccount) -> Ordering {
    ranks
        .compare(a.primary_role(), b.primary_role())
        .then_with(|| a.joined_at.cmp(&b.joined_at))
}

// ============================================================================
// TESTS
// ============================================================================
