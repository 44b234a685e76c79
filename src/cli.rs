use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tabled::{Table, Tabled};

use crate::domain::{LatestLine, LineMovementEvent};
use crate::store::dvp::DvpRankRow;

#[derive(Parser)]
#[command(name = "stakebook")]
#[command(version = "0.1.0")]
#[command(about = "Sports-betting journal data layer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory path
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pending database migrations
    Migrate,
    /// Refresh the player stat caches from the stats API
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Ingest one bookmaker line observation
    RecordLine {
        /// Upstream player id
        #[arg(long)]
        player: i64,
        /// Market, e.g. pts, reb, ast
        #[arg(long)]
        market: String,
        /// Bookmaker key, e.g. draftkings
        #[arg(long)]
        book: String,
        /// Observed line
        #[arg(long)]
        line: Decimal,
        /// Decimal odds on the over
        #[arg(long)]
        over: Option<Decimal>,
        /// Decimal odds on the under
        #[arg(long)]
        under: Option<Decimal>,
    },
    /// Latest defense-vs-position ranks per team
    Dvp {
        /// Season start year, e.g. 2025 for 2025-26
        #[arg(long)]
        season: i32,
        /// Position bucket (PG, SG, SF, PF, C)
        #[arg(long)]
        position: String,
        /// Metric (pts, reb, ast, fg3m, stl, blk)
        #[arg(long, default_value = "pts")]
        metric: String,
        /// As-of date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show latest lines and recent movement for a player market
    Lines {
        /// Upstream player id
        #[arg(long)]
        player: i64,
        /// Market, e.g. pts
        #[arg(long)]
        market: String,
        /// Restrict the event log to one bookmaker
        #[arg(long)]
        book: Option<String>,
    },
    /// Bankroll summary for one account's journal
    Report {
        /// Account email
        #[arg(long)]
        email: String,
        /// Restrict to one sport
        #[arg(long)]
        sport: Option<String>,
    },
    /// Seed a demo account with an engineered bet history
    Seed {
        /// Demo account email
        #[arg(long, default_value = "demo@stakebook.app")]
        email: String,
        /// Number of bets to generate
        #[arg(long, default_value = "120")]
        bets: usize,
        /// RNG seed for reproducible output
        #[arg(long, default_value = "20260101")]
        seed: u64,
        /// Win/loss pattern for the most recent bets, oldest first
        #[arg(long, default_value = "WWLWWWLWWW")]
        pattern: String,
    },
    /// Drop expired prediction-cache rows
    PruneCache,
    /// Delete a demo account and its journal
    PurgeDemo {
        /// Demo account email
        #[arg(long)]
        email: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Sync player identities and season averages for a name search
    Players {
        /// Name fragment to search for
        #[arg(long)]
        search: String,
        /// Season start year
        #[arg(long)]
        season: i32,
    },
    /// Sync all box lines for a calendar date
    Games {
        /// Game date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Recompute DvP snapshots from the cached box lines
    Dvp {
        /// Season start year
        #[arg(long)]
        season: i32,
        /// Snapshot date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Tabled)]
struct DvpDisplayRow {
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Rank")]
    rank: i32,
    #[tabled(rename = "Allowed/Game")]
    allowed: String,
    #[tabled(rename = "As Of")]
    as_of: String,
}

pub fn render_dvp_table(rows: &[DvpRankRow]) -> String {
    let display: Vec<DvpDisplayRow> = rows
        .iter()
        .map(|r| DvpDisplayRow {
            team: r.team_abbreviation.clone(),
            rank: r.rank,
            allowed: r.value_allowed.to_string(),
            as_of: r.snapshot_date.to_string(),
        })
        .collect();
    Table::new(display).to_string()
}

#[derive(Tabled)]
struct LineDisplayRow {
    #[tabled(rename = "Book")]
    book: String,
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "Over")]
    over: String,
    #[tabled(rename = "Under")]
    under: String,
    #[tabled(rename = "Last Change")]
    last_change: String,
}

pub fn render_lines_table(rows: &[LatestLine]) -> String {
    let display: Vec<LineDisplayRow> = rows
        .iter()
        .map(|r| LineDisplayRow {
            book: r.bookmaker.clone(),
            line: r.current_line.to_string(),
            open: r.opening_line.to_string(),
            over: r
                .current_over_odds
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            under: r
                .current_under_odds
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            last_change: r.last_changed_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();
    Table::new(display).to_string()
}

#[derive(Tabled)]
struct EventDisplayRow {
    #[tabled(rename = "Changed")]
    changed: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Dir")]
    direction: String,
}

pub fn render_events_table(rows: &[LineMovementEvent]) -> String {
    let display: Vec<EventDisplayRow> = rows
        .iter()
        .map(|r| EventDisplayRow {
            changed: r.changed_at.format("%Y-%m-%d %H:%M").to_string(),
            from: r.previous_line.to_string(),
            to: r.new_line.to_string(),
            direction: r.direction.as_str().to_string(),
        })
        .collect();
    Table::new(display).to_string()
}
