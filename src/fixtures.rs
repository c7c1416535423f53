// Shared roster fixtures for unit tests
//
// Six members present on both sides, one per rank, already in sorted order.
// NeedsPromoted joined long ago (with a mangled timestamp, as real exports
// sometimes have); SecondSpear joined two days before AS_OF.

use crate::entities::{CommunityAccount, GameAccount};
use crate::ranks::{RankEntry, RankTable};
use crate::temporal::JoinedAt;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const COMMUNITY_JOINED_MILLIS: i64 = 1_616_253_509_000;

pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

pub fn rank_entries() -> Vec<RankEntry> {
    vec![
        RankEntry::new("Spearmarshal", 1),
        RankEntry::new("General", 2),
        RankEntry::new("Captain", 3),
        RankEntry::new("First Spear", 4),
        RankEntry::new("Second Spear", 5),
        RankEntry::new("Guest", 6),
        RankEntry::new("Bots", 7),
    ]
}

pub fn ranks() -> RankTable {
    RankTable::new(rank_entries())
}

pub fn game(name: &str, rank: &str, joined: &str) -> GameAccount {
    GameAccount::new(name, rank, JoinedAt::from_iso(joined))
}

pub fn game_joined_days_ago(name: &str, rank: &str, days: i64) -> GameAccount {
    GameAccount::new(name, rank, JoinedAt::at(as_of() - Duration::days(days)))
}

pub fn community(name: &str, roles: &[&str]) -> CommunityAccount {
    CommunityAccount::new(name, roles, JoinedAt::from_epoch_millis(COMMUNITY_JOINED_MILLIS))
}

pub fn game_accounts() -> Vec<GameAccount> {
    vec![
        game("Test.1234", "Spearmarshal", "2020-03-21T00:00:00.000Z"),
        game("Other.3456", "General", "2020-03-21T00:00:00.000Z"),
        game("Captain.1324", "Captain", "2020-03-21T00:00:00.000Z"),
        game("FirstSpear.5432", "First Spear", "2021-03-20T00:00:00.000Z"),
        game("NeedsPromoted.5432", "Second Spear", "2020-03-20:T00:00:00.000Z"),
        game_joined_days_ago("SecondSpear.5432", "Second Spear", 2),
    ]
}

pub fn community_accounts() -> Vec<CommunityAccount> {
    vec![
        community("Test", &["Spearmarshal"]),
        community("Other", &["General"]),
        community("Captain", &["Captain"]),
        community("FirstSpear", &["First Spear"]),
        community("NeedsPromoted", &["Second Spear"]),
        community("SecondSpear", &["Second Spear"]),
    ]
}

/// Fixture rosters minus NeedsPromoted on both sides: nothing to report
pub fn clean_rosters() -> (Vec<GameAccount>, Vec<CommunityAccount>) {
    let mut game = game_accounts();
    game.remove(4);
    let mut community = community_accounts();
    community.remove(4);
    (game, community)
}
