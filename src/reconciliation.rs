// ⚖️ Reconciliation Engine - Compare the game roster with the community roster
//
// One engine = one run. It takes both rosters and the rank table, sorts the
// rosters once, and answers every discrepancy question from those snapshots:
//
//   excess_game        game accounts nobody in the community matches
//   excess_community   community accounts no game account matches
//   no_role            community accounts without a rank role
//   multiple_roles     community accounts with more than one rank role
//   mismatched_roles   matched pairs whose single role differs from the rank
//   needs_promotion    members past the waiting period at the entry rank
//
// The engine does no I/O. The only clock it reads is the `as_of` instant,
// captured at construction and overridable for reproducible runs.

use crate::config::ReconcilePolicy;
use crate::entities::{CommunityAccount, GameAccount};
use crate::matching::{normalize_display_name, HandleMatcher};
use crate::ranks::RankTable;
use crate::report::ActionReport;
use crate::roster::{sort_community_roster, sort_game_roster};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::debug;

// ============================================================================
// ROLE MISMATCH
// ============================================================================

/// A matched pair whose single community role disagrees with the game rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMismatch<'a> {
    pub game: &'a GameAccount,
    pub community: &'a CommunityAccount,
    pub community_role: &'a str,
}

/// `"<game name> (<game rank>/<community role>)"`
impl fmt::Display for RoleMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.game.name, self.game.rank, self.community_role
        )
    }
}

// ============================================================================
// DISCREPANCY SET
// ============================================================================

/// Every discrepancy list of one run, computed together
#[derive(Debug, Clone, Serialize)]
pub struct DiscrepancySet<'a> {
    pub excess_game: Vec<&'a GameAccount>,
    pub excess_community: Vec<&'a CommunityAccount>,
    pub no_role: Vec<&'a CommunityAccount>,
    pub multiple_roles: Vec<&'a CommunityAccount>,
    pub mismatched_roles: Vec<RoleMismatch<'a>>,
    pub needs_promotion: Vec<&'a GameAccount>,
}

impl DiscrepancySet<'_> {
    pub fn is_empty(&self) -> bool {
        self.excess_game.is_empty()
            && self.excess_community.is_empty()
            && self.no_role.is_empty()
            && self.multiple_roles.is_empty()
            && self.mismatched_roles.is_empty()
            && self.needs_promotion.is_empty()
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    ranks: RankTable,
    policy: ReconcilePolicy,
    as_of: DateTime<Utc>,

    /// Sorted by rank, then join time
    game_roster: Vec<GameAccount>,

    /// Sorted by primary role, then join time
    community_roster: Vec<CommunityAccount>,

    /// One per game account, same order as `game_roster`
    game_matchers: Vec<HandleMatcher>,

    /// Normalized display names, same order as `community_roster`
    community_names: Vec<String>,
}

impl ReconciliationEngine {
    /// Start a run with the default policy, evaluated as of now
    pub fn new(game: &[GameAccount], community: &[CommunityAccount], ranks: RankTable) -> Self {
        let game_roster = sort_game_roster(game, &ranks);
        let community_roster = sort_community_roster(community, &ranks);

        let game_matchers = game_roster
            .iter()
            .map(|account| HandleMatcher::new(&account.name))
            .collect();
        let community_names = community_roster
            .iter()
            .map(|account| normalize_display_name(&account.display_name))
            .collect();

        debug!(
            game = game_roster.len(),
            community = community_roster.len(),
            ranks = ranks.len(),
            "rosters sorted"
        );

        ReconciliationEngine {
            ranks,
            policy: ReconcilePolicy::default(),
            as_of: Utc::now(),
            game_roster,
            community_roster,
            game_matchers,
            community_names,
        }
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Evaluate time-based checks against `as_of` instead of now
    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn game_roster(&self) -> &[GameAccount] {
        &self.game_roster
    }

    pub fn community_roster(&self) -> &[CommunityAccount] {
        &self.community_roster
    }

    pub fn rank_table(&self) -> &RankTable {
        &self.ranks
    }

    pub fn policy(&self) -> &ReconcilePolicy {
        &self.policy
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// First community account (in roster order) matching a game account name
    pub fn find_community_match(&self, game_name: &str) -> Option<&CommunityAccount> {
        self.find_with(&HandleMatcher::new(game_name))
    }

    fn find_with(&self, matcher: &HandleMatcher) -> Option<&CommunityAccount> {
        self.community_names
            .iter()
            .position(|name| matcher.matches_normalized(name))
            .map(|idx| &self.community_roster[idx])
    }

    /// Game accounts (alts excluded) with no community counterpart
    pub fn excess_game(&self) -> Vec<&GameAccount> {
        self.game_roster
            .iter()
            .zip(&self.game_matchers)
            .filter(|(account, _)| !self.policy.is_alt(&account.rank))
            .filter(|(_, matcher)| self.find_with(matcher).is_none())
            .map(|(account, _)| account)
            .collect()
    }

    /// Community accounts no game account matches
    pub fn excess_community(&self) -> Vec<&CommunityAccount> {
        self.community_roster
            .iter()
            .zip(&self.community_names)
            .filter(|(_, name)| {
                !self
                    .game_matchers
                    .iter()
                    .any(|matcher| matcher.matches_normalized(name))
            })
            .map(|(account, _)| account)
            .collect()
    }

    pub fn no_role(&self) -> Vec<&CommunityAccount> {
        self.community_roster
            .iter()
            .filter(|account| account.has_no_role())
            .collect()
    }

    pub fn multiple_roles(&self) -> Vec<&CommunityAccount> {
        self.community_roster
            .iter()
            .filter(|account| account.has_multiple_roles())
            .collect()
    }

    /// Matched pairs where the community side holds exactly one role and it
    /// isn't the game rank. Alts are skipped.
    pub fn mismatched_roles(&self) -> Vec<RoleMismatch<'_>> {
        self.game_roster
            .iter()
            .zip(&self.game_matchers)
            .filter(|(account, _)| !self.policy.is_alt(&account.rank))
            .filter_map(|(account, matcher)| {
                let community = self.find_with(matcher)?;
                let role = community.sole_role()?;
                (role != account.rank).then_some(RoleMismatch {
                    game: account,
                    community,
                    community_role: role,
                })
            })
            .collect()
    }

    /// Members at the promotion rank whose join DATE is at least
    /// `promotion_after_days` whole days before `as_of`
    pub fn needs_promotion(&self) -> Vec<&GameAccount> {
        let threshold = i64::from(self.policy.promotion_after_days);

        self.game_roster
            .iter()
            .filter(|account| account.has_rank(&self.policy.promotion_rank))
            .filter(|account| {
                account
                    .joined_at
                    .whole_days_before(self.as_of)
                    .is_some_and(|days| days >= threshold)
            })
            .collect()
    }

    /// All discrepancy lists at once
    pub fn discrepancies(&self) -> DiscrepancySet<'_> {
        let set = DiscrepancySet {
            excess_game: self.excess_game(),
            excess_community: self.excess_community(),
            no_role: self.no_role(),
            multiple_roles: self.multiple_roles(),
            mismatched_roles: self.mismatched_roles(),
            needs_promotion: self.needs_promotion(),
        };

        debug!(
            excess_game = set.excess_game.len(),
            excess_community = set.excess_community.len(),
            no_role = set.no_role.len(),
            multiple_roles = set.multiple_roles.len(),
            mismatched_roles = set.mismatched_roles.len(),
            needs_promotion = set.needs_promotion.len(),
            "discrepancies computed"
        );

        set
    }

    /// Combined action report for this run
    pub fn report(&self) -> ActionReport {
        ActionReport::assemble(&self.discrepancies(), &self.policy)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::temporal::JoinedAt;

    fn engine(game: &[GameAccount], community: &[CommunityAccount]) -> ReconciliationEngine {
        ReconciliationEngine::new(game, community, ranks()).with_as_of(as_of())
    }

    fn game_names(accounts: &[&GameAccount]) -> Vec<String> {
        accounts.iter().map(|a| a.name.clone()).collect()
    }

    fn community_names(accounts: &[&CommunityAccount]) -> Vec<String> {
        accounts.iter().map(|a| a.display_name.clone()).collect()
    }

    // ------------------------------------------------------------------------
    // Rosters
    // ------------------------------------------------------------------------

    #[test]
    fn test_rosters_come_back_sorted() {
        let game = game_accounts();
        let community = community_accounts();
        let shuffle = [3, 0, 4, 1, 5, 2];

        let shuffled_game: Vec<_> = shuffle.iter().map(|&i| game[i].clone()).collect();
        let shuffled_community: Vec<_> = shuffle.iter().map(|&i| community[i].clone()).collect();

        let engine = engine(&shuffled_game, &shuffled_community);

        assert_eq!(engine.game_roster(), game.as_slice());
        assert_eq!(engine.community_roster(), community.as_slice());
    }

    #[test]
    fn test_single_role_groups_are_contiguous_and_by_date() {
        let joined = JoinedAt::from_epoch_millis;
        let members = vec![
            CommunityAccount::new("c", &["Captain"], joined(3)),
            CommunityAccount::new("g", &["General"], joined(9)),
            CommunityAccount::new("a", &["Captain"], joined(1)),
            CommunityAccount::new("b", &["General"], joined(2)),
        ];

        let engine = engine(&[], &members);
        let roster = engine.community_roster();

        let roles: Vec<&str> = roster.iter().filter_map(|a| a.primary_role()).collect();
        assert_eq!(roles, vec!["General", "General", "Captain", "Captain"]);
        for pair in roster.windows(2) {
            if pair[0].primary_role() == pair[1].primary_role() {
                assert!(pair[0].joined_at <= pair[1].joined_at);
            }
        }
    }

    #[test]
    fn test_find_community_match() {
        let engine = engine(&game_accounts(), &community_accounts());

        let found = engine.find_community_match("Captain.1324").unwrap();
        assert_eq!(found.display_name, "Captain");
        assert!(engine.find_community_match("Nobody.0000").is_none());
    }

    // ------------------------------------------------------------------------
    // Excess accounts
    // ------------------------------------------------------------------------

    #[test]
    fn test_excess_game_same_members() {
        let engine = engine(&game_accounts(), &community_accounts());
        assert!(engine.excess_game().is_empty());
    }

    #[test]
    fn test_excess_game_missing_community() {
        let engine = engine(&game_accounts(), &community_accounts()[..5]);

        assert_eq!(game_names(&engine.excess_game()), vec!["SecondSpear.5432"]);
    }

    #[test]
    fn test_excess_game_ignores_missing_game() {
        let engine = engine(&game_accounts()[..4], &community_accounts());

        assert!(engine.excess_game().is_empty());
    }

    #[test]
    fn test_excess_simple_pair() {
        let game = vec![
            game("Test.1234", "Spearmarshal", "2020-03-21T00:00:00Z"),
            game("Other.3456", "General", "2020-03-21T00:00:00Z"),
        ];
        let community = vec![community("Test", &["Spearmarshal"])];

        let engine = engine(&game, &community);

        assert_eq!(game_names(&engine.excess_game()), vec!["Other.3456"]);
        assert_eq!(engine.excess_game()[0].rank, "General");
        assert!(engine.excess_community().is_empty());
    }

    #[test]
    fn test_excess_game_skips_alts() {
        let mut game = game_accounts();
        game.push(game_joined_days_ago("Mule.9999", "Alt", 100));

        let engine = engine(&game, &community_accounts());
        assert!(engine.excess_game().is_empty());
    }

    #[test]
    fn test_excess_community_missing_game() {
        let engine = engine(&game_accounts()[1..], &community_accounts());

        assert_eq!(community_names(&engine.excess_community()), vec!["Test"]);
    }

    #[test]
    fn test_excess_community_same_or_fewer_members() {
        let engine = engine(&game_accounts(), &community_accounts());
        assert!(engine.excess_community().is_empty());

        let engine = self::engine(&game_accounts(), &community_accounts()[..5]);
        assert!(engine.excess_community().is_empty());
    }

    #[test]
    fn test_excess_sides_never_match_each_other() {
        let game = vec![
            game("Alpha.1111", "General", "2020-01-01T00:00:00Z"),
            game("Beta.2222", "Captain", "2020-01-01T00:00:00Z"),
            game("Gamma.3333", "Captain", "2020-01-01T00:00:00Z"),
        ];
        let community = vec![
            community("alpha", &["General"]),
            community("Betamax", &["Captain"]),
            community("🎮 Delta", &[]),
            community("gam (gamma)", &["Captain"]),
        ];

        let engine = engine(&game, &community);
        let excess_game = engine.excess_game();
        let excess_community = engine.excess_community();

        assert_eq!(game_names(&excess_game), vec!["Beta.2222"]);
        assert_eq!(community_names(&excess_community), vec!["Betamax", "🎮 Delta"]);
        for g in &excess_game {
            for c in &excess_community {
                assert!(!crate::matching::matches(&g.name, &c.display_name));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Role checks
    // ------------------------------------------------------------------------

    #[test]
    fn test_no_role() {
        let engine = engine(&game_accounts(), &community_accounts());
        assert!(engine.no_role().is_empty());

        let mut members = community_accounts();
        members.push(community("Mock", &[]));
        let engine = self::engine(&game_accounts(), &members);

        assert_eq!(community_names(&engine.no_role()), vec!["Mock"]);
    }

    #[test]
    fn test_multiple_roles() {
        let engine = engine(&game_accounts(), &community_accounts());
        assert!(engine.multiple_roles().is_empty());

        let mut members = community_accounts();
        members.push(community("Mock", &["Spearmarshal", "General"]));
        let engine = self::engine(&game_accounts(), &members);

        let multiple = engine.multiple_roles();
        assert_eq!(community_names(&multiple), vec!["Mock"]);
        assert_eq!(multiple[0].role_tags, vec!["Spearmarshal", "General"]);
    }

    #[test]
    fn test_mismatched_none() {
        let engine = engine(&game_accounts(), &community_accounts());
        assert!(engine.mismatched_roles().is_empty());
    }

    #[test]
    fn test_mismatched_ignores_unmatched_accounts() {
        let mut members = community_accounts();
        members.push(community("Mock", &["Spearmarshal", "General"]));
        let engine = engine(&game_accounts(), &members);
        assert!(engine.mismatched_roles().is_empty());

        let mut accounts = game_accounts();
        accounts.push(game("Mock", "Spearmarshal", "2020-03-01T00:00:00.000Z"));
        let engine = self::engine(&accounts, &community_accounts());
        assert!(engine.mismatched_roles().is_empty());
    }

    #[test]
    fn test_multiple_roles_never_mismatched() {
        let mut members = community_accounts()[..4].to_vec();
        members.push(community("SecondSpear", &["First Spear", "Second Spear"]));

        let engine = engine(&game_accounts(), &members);

        assert_eq!(community_names(&engine.multiple_roles()), vec!["SecondSpear"]);
        assert!(engine.mismatched_roles().is_empty());
    }

    #[test]
    fn test_no_roles_never_mismatched() {
        let mut members = community_accounts()[..4].to_vec();
        members.push(community("SecondSpear", &[]));

        let engine = engine(&game_accounts(), &members);
        assert!(engine.mismatched_roles().is_empty());
    }

    #[test]
    fn test_mismatched_candidate() {
        let mut members = community_accounts()[..4].to_vec();
        members.push(community("SecondSpear", &["First Spear"]));

        let engine = engine(&game_accounts(), &members);
        let mismatched = engine.mismatched_roles();

        assert_eq!(mismatched.len(), 1);
        assert_eq!(mismatched[0].community_role, "First Spear");
        assert_eq!(mismatched[0].community.display_name, "SecondSpear");
        assert_eq!(
            mismatched[0].to_string(),
            "SecondSpear.5432 (Second Spear/First Spear)"
        );
    }

    #[test]
    fn test_mismatched_skips_alts() {
        let game = vec![game_joined_days_ago("Mule.1111", "Alt", 30)];
        let community = vec![community("Mule", &["General"])];

        let engine = engine(&game, &community);
        assert!(engine.mismatched_roles().is_empty());
    }

    // ------------------------------------------------------------------------
    // Promotion
    // ------------------------------------------------------------------------

    #[test]
    fn test_needs_promotion_fixture() {
        let engine = engine(&game_accounts(), &community_accounts());
        assert_eq!(game_names(&engine.needs_promotion()), vec!["NeedsPromoted.5432"]);

        let (game, community) = clean_rosters();
        let engine = self::engine(&game, &community);
        assert!(engine.needs_promotion().is_empty());
    }

    #[test]
    fn test_needs_promotion_after_waiting_period() {
        let game = vec![
            game_joined_days_ago("Veteran.0001", "Second Spear", 20),
            game_joined_days_ago("Fresh.0001", "Second Spear", 5),
            game_joined_days_ago("Edge.0001", "Second Spear", 14),
            game_joined_days_ago("Officer.0001", "Captain", 300),
        ];

        let engine = engine(&game, &[]);

        assert_eq!(
            game_names(&engine.needs_promotion()),
            vec!["Veteran.0001", "Edge.0001"]
        );
    }

    #[test]
    fn test_needs_promotion_ignores_future_and_unknown_dates() {
        let game = vec![
            game_joined_days_ago("Future.0001", "Second Spear", -30),
            game("Unknown.0001", "Second Spear", "sometime"),
        ];

        let engine = engine(&game, &[]);
        assert!(engine.needs_promotion().is_empty());
    }

    #[test]
    fn test_policy_override() {
        let game = vec![
            game_joined_days_ago("Recruit.0001", "Recruit", 8),
            game_joined_days_ago("Mule.0001", "Mule", 8),
        ];
        let policy = ReconcilePolicy {
            alt_rank: "Mule".to_string(),
            promotion_rank: "Recruit".to_string(),
            promotion_after_days: 7,
            ..ReconcilePolicy::default()
        };

        let engine = engine(&game, &[]).with_policy(policy);

        assert_eq!(game_names(&engine.needs_promotion()), vec!["Recruit.0001"]);
        assert_eq!(game_names(&engine.excess_game()), vec!["Recruit.0001"]);
    }

    #[test]
    fn test_discrepancy_set_matches_individual_queries() {
        let mut members = community_accounts();
        members.push(community("Extra", &["General", "Captain"]));
        let engine = engine(&game_accounts()[1..], &members);

        let set = engine.discrepancies();

        assert!(!set.is_empty());
        assert_eq!(set.excess_game, engine.excess_game());
        assert_eq!(set.excess_community, engine.excess_community());
        assert_eq!(set.multiple_roles, engine.multiple_roles());
        assert_eq!(set.needs_promotion, engine.needs_promotion());
    }

    #[test]
    fn test_clean_rosters_have_no_discrepancies() {
        let (game, community) = clean_rosters();
        let engine = engine(&game, &community);

        assert!(engine.discrepancies().is_empty());
    }
}
