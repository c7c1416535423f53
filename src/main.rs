use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use library instead of local modules
use roster_reconcile::report::{format_excess_community, format_multiple_roles, NO_ROLE_LABEL};
use roster_reconcile::{ReconcileConfig, ReconciliationEngine, RosterInputs};

/// Reconcile a game guild roster against a chat community roster
#[derive(Parser)]
#[command(name = "roster-reconcile")]
#[command(version, long_about = None)]
struct Cli {
    /// Game roster export (JSON, or CSV with name,rank,joined)
    #[arg(long, env = "ROSTER_GAME_FILE")]
    game: PathBuf,

    /// Community roster export (JSON)
    #[arg(long, env = "ROSTER_COMMUNITY_FILE")]
    community: PathBuf,

    /// Guild rank listing (JSON)
    #[arg(long, env = "ROSTER_RANKS_FILE")]
    ranks: PathBuf,

    /// Policy configuration (TOML)
    #[arg(short, long, env = "ROSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Evaluate as of this RFC 3339 instant instead of now
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<DateTime<Utc>>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Game roster sorted by rank, then join date
    GameRoster,
    /// Community roster sorted by role, then join date
    CommunityRoster,
    /// Game accounts missing from the community
    ExcessGame,
    /// Community accounts missing from the game
    ExcessCommunity,
    /// Community accounts without a rank role
    NoRoles,
    /// Community accounts with more than one rank role
    MultipleRoles,
    /// Game ranks that disagree with community roles
    MismatchedRoles,
    /// Members due for promotion
    NeedsPromotion,
    /// Everything an administrator has to act on
    RequiredActions,
}

fn parse_as_of(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 instant '{value}': {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays the report
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ReconcileConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let inputs = RosterInputs::load(&cli.game, &cli.community, &cli.ranks)?;

    let mut engine = ReconciliationEngine::new(&inputs.game, &inputs.community, inputs.ranks)
        .with_policy(config.policy);
    if let Some(as_of) = cli.as_of {
        engine = engine.with_as_of(as_of);
    }

    info!(
        game = engine.game_roster().len(),
        community = engine.community_roster().len(),
        as_of = %engine.as_of(),
        "reconciling rosters"
    );

    run_command(&engine, cli.command, cli.json)
}

fn run_command(engine: &ReconciliationEngine, command: Command, json: bool) -> Result<()> {
    match command {
        Command::GameRoster => {
            let roster = engine.game_roster();
            emit(json, &roster, || {
                roster.iter().map(|a| format!("{} — {}", a.name, a.rank)).collect()
            })
        }
        Command::CommunityRoster => {
            let roster = engine.community_roster();
            emit(json, &roster, || {
                roster
                    .iter()
                    .map(|a| format!("{} — {}", a.display_name, a.primary_role().unwrap_or(NO_ROLE_LABEL)))
                    .collect()
            })
        }
        Command::ExcessGame => {
            let excess = engine.excess_game();
            emit(json, &excess, || {
                excess.iter().map(|a| format!("{} — {}", a.name, a.rank)).collect()
            })
        }
        Command::ExcessCommunity => {
            let excess = engine.excess_community();
            emit(json, &excess, || {
                excess.iter().map(|a| format_excess_community(a)).collect()
            })
        }
        Command::NoRoles => {
            let accounts = engine.no_role();
            emit(json, &accounts, || {
                accounts.iter().map(|a| a.display_name.clone()).collect()
            })
        }
        Command::MultipleRoles => {
            let accounts = engine.multiple_roles();
            emit(json, &accounts, || {
                accounts.iter().map(|a| format_multiple_roles(a)).collect()
            })
        }
        Command::MismatchedRoles => {
            let mismatched = engine.mismatched_roles();
            emit(json, &mismatched, || {
                mismatched.iter().map(|m| m.to_string()).collect()
            })
        }
        Command::NeedsPromotion => {
            let due = engine.needs_promotion();
            emit(json, &due, || {
                due.iter()
                    .map(|a| match a.joined_at.date() {
                        Some(date) => format!("{} — joined {}", a.name, date),
                        None => a.name.clone(),
                    })
                    .collect()
            })
        }
        Command::RequiredActions => {
            let report = engine.report();
            info!("{}", report.summary());
            emit(json, &report, || {
                let mut lines = Vec::new();
                for record in report.records() {
                    lines.push(format!("{}:", record.key));
                    lines.extend(record.entries.iter().map(|e| format!("  {}", e)));
                }
                lines
            })
        }
    }
}

/// Print either the JSON form of `value` or the text lines
fn emit<T, F>(json: bool, value: &T, lines: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> Vec<String>,
{
    if json {
        let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{}", out);
    } else {
        for line in lines() {
            println!("{}", line);
        }
    }
    Ok(())
}
