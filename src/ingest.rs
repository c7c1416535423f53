// 📥 Ingestion - Roster exports on disk → engine input
//
// Thin adapters between whatever fetched the rosters and the pure engine:
//
//   ranks      JSON   [{"id": "General", "order": 2}, ...]
//   game       JSON   [{"name": "Test.1234", "rank": "General", "joined": "..."}]
//              CSV    name,rank,joined
//   community  JSON   [{"displayName": "Test", "roles": [...], "joinedTimestamp": 0}]
//
// Community roles are reduced to rank roles here, once, against the run's
// RankTable.

use crate::entities::{CommunityAccount, CommunityMember, GameAccount, GameMember};
use crate::ranks::{RankEntry, RankTable};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// FILE FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Json,
    Csv,
}

impl RosterFormat {
    /// Detect by file extension; anything but `.csv` is read as JSON
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => RosterFormat::Csv,
            _ => RosterFormat::Json,
        }
    }
}

// ============================================================================
// LOADERS
// ============================================================================

pub fn load_rank_entries(path: &Path) -> Result<Vec<RankEntry>> {
    let entries: Vec<RankEntry> = read_json(path)?;
    debug!(path = %path.display(), count = entries.len(), "loaded ranks");
    Ok(entries)
}

pub fn load_game_members(path: &Path) -> Result<Vec<GameMember>> {
    let members = match RosterFormat::detect(path) {
        RosterFormat::Json => read_json(path)?,
        RosterFormat::Csv => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            parse_game_csv(file)
                .with_context(|| format!("Failed to parse game roster CSV: {}", path.display()))?
        }
    };
    debug!(path = %path.display(), count = members.len(), "loaded game roster");
    Ok(members)
}

pub fn load_community_members(path: &Path) -> Result<Vec<CommunityMember>> {
    let members: Vec<CommunityMember> = read_json(path)?;
    debug!(path = %path.display(), count = members.len(), "loaded community roster");
    Ok(members)
}

/// Game roster CSV with header `name,rank,joined`
pub fn parse_game_csv<R: Read>(reader: R) -> Result<Vec<GameMember>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut members = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let mut member: GameMember =
            result.with_context(|| format!("Failed to deserialize game member on row {}", idx + 1))?;
        if member.joined.as_deref().is_some_and(str::is_empty) {
            member.joined = None;
        }
        members.push(member);
    }

    Ok(members)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

// ============================================================================
// NORMALIZATION
// ============================================================================

pub fn game_accounts(members: Vec<GameMember>) -> Vec<GameAccount> {
    members
        .into_iter()
        .map(|member| {
            let account = GameAccount::from(member);
            if !account.joined_at.is_known() {
                warn!(name = %account.name, "unreadable join date, treating as oldest");
            }
            account
        })
        .collect()
}

pub fn community_accounts(members: Vec<CommunityMember>, ranks: &RankTable) -> Vec<CommunityAccount> {
    members
        .into_iter()
        .map(|member| member.normalize(ranks))
        .collect()
}

// ============================================================================
// ROSTER INPUTS
// ============================================================================

/// Everything one reconciliation run needs, materialized
#[derive(Debug, Clone)]
pub struct RosterInputs {
    pub game: Vec<GameAccount>,
    pub community: Vec<CommunityAccount>,
    pub ranks: RankTable,
}

impl RosterInputs {
    pub fn from_members(
        game: Vec<GameMember>,
        community: Vec<CommunityMember>,
        rank_entries: Vec<RankEntry>,
    ) -> Self {
        let ranks = RankTable::new(rank_entries);
        let community = community_accounts(community, &ranks);
        RosterInputs {
            game: game_accounts(game),
            community,
            ranks,
        }
    }

    pub fn load(game_path: &Path, community_path: &Path, ranks_path: &Path) -> Result<Self> {
        let rank_entries = load_rank_entries(ranks_path)?;
        let game = load_game_members(game_path)?;
        let community = load_community_members(community_path)?;
        Ok(RosterInputs::from_members(game, community, rank_entries))
    }
}

// ============================================================================
// TESTS
// ============================================================================
