use chrono::Utc;
use clap::Parser;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use stakebook::cli::{self, Cli, Commands, SyncCommands};
use stakebook::config::{AppConfig, LoggingConfig};
use stakebook::domain::{
    realized_profit, season_label, win_rate, BetFilter, BetResult, LineObservation, Metric,
    PlayerSeasonAverage, Position,
};
use stakebook::error::{Result, StakebookError};
use stakebook::seed::{purge_demo_user, DemoSeeder, SeedPlan};
use stakebook::stats::{self, StatsClient};
use stakebook::store::JournalStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;
    init_logging(&config.logging);

    let store = JournalStore::new(&config.database.url, config.database.max_connections).await?;

    match cli.command {
        Commands::Migrate => {
            store.migrate().await?;
        }
        Commands::Sync { command } => match command {
            SyncCommands::Players { search, season } => {
                let client = StatsClient::new(&config.stats)?;
                run_sync_players(&store, &client, &search, season).await?;
            }
            SyncCommands::Games { date } => {
                let client = StatsClient::new(&config.stats)?;
                run_sync_games(&store, &client, date).await?;
            }
            SyncCommands::Dvp { season, date } => {
                let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
                let count = store.rebuild_dvp_for_date(season, as_of).await?;
                println!(
                    "Rebuilt {} DvP rows for {} as of {}",
                    count,
                    season_label(season),
                    as_of
                );
            }
        },
        Commands::RecordLine {
            player,
            market,
            book,
            line,
            over,
            under,
        } => {
            let observation = LineObservation {
                player_id: player,
                market,
                bookmaker: book,
                line,
                over_odds: over,
                under_odds: under,
                observed_at: Utc::now(),
            };
            match store.record_observation(&observation).await? {
                Some(change) => println!(
                    "Line moved {} -> {} ({})",
                    change.previous_line,
                    change.new_line,
                    change.direction.as_str()
                ),
                None => println!("No movement recorded (line unchanged at {})", line),
            }
        }
        Commands::Dvp {
            season,
            position,
            metric,
            date,
        } => {
            let position =
                Position::try_from(position.as_str()).map_err(StakebookError::Validation)?;
            let metric = Metric::try_from(metric.as_str()).map_err(StakebookError::Validation)?;
            let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
            let rows = store
                .get_latest_dvp_snapshots(&season_label(season), position, metric, as_of)
                .await?;
            if rows.is_empty() {
                println!(
                    "No snapshots for {} {} {} at or before {}",
                    season_label(season),
                    position,
                    metric,
                    as_of
                );
            } else {
                println!("{}", cli::render_dvp_table(&rows));
            }
        }
        Commands::Lines {
            player,
            market,
            book,
        } => {
            let lines = store.list_latest_lines(player, &market).await?;
            if lines.is_empty() {
                println!("No lines recorded for player {} {}", player, market);
            } else {
                println!("{}", cli::render_lines_table(&lines));
            }
            if let Some(book) = book {
                let events = store.get_movement_events(player, &market, &book, 20).await?;
                if !events.is_empty() {
                    println!("\nRecent movement ({}):", book);
                    println!("{}", cli::render_events_table(&events));
                }
            }
        }
        Commands::Report { email, sport } => {
            run_report(&store, &email, sport).await?;
        }
        Commands::Seed {
            email,
            bets,
            seed,
            pattern,
        } => {
            let plan = SeedPlan {
                email,
                bet_count: bets,
                rng_seed: seed,
                tail_pattern: pattern,
                ..SeedPlan::default()
            };
            let user_id = DemoSeeder::new(plan).run(&store).await?;
            println!("Seeded demo user {}", user_id);
        }
        Commands::PruneCache => {
            let removed = store.purge_expired_predictions().await?;
            println!("Removed {} expired prediction rows", removed);
        }
        Commands::PurgeDemo { email, yes } => {
            if !yes {
                println!("Refusing to delete {} without --yes", email);
                return Ok(());
            }
            let removed = purge_demo_user(&store, &email).await?;
            println!("Deleted {} and {} bets", email, removed);
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_report(store: &JournalStore, email: &str, sport: Option<String>) -> Result<()> {
    let user_id = store
        .get_auth_user_id_by_email(email)
        .await?
        .ok_or_else(|| StakebookError::NotFound(format!("no auth user for {}", email)))?;

    let filter = BetFilter {
        sport,
        limit: Some(1000),
        ..BetFilter::default()
    };
    let bets = store.list_bets(user_id, &filter).await?;
    if bets.is_empty() {
        println!("No bets recorded for {}", email);
        return Ok(());
    }

    let wins = bets.iter().filter(|b| b.result == BetResult::Win).count();
    let losses = bets.iter().filter(|b| b.result == BetResult::Loss).count();
    let voids = bets.iter().filter(|b| b.result == BetResult::Void).count();
    let pending = bets.iter().filter(|b| b.result == BetResult::Pending).count();

    println!("Journal for {} ({} bets)", email, bets.len());
    println!("Record: {}-{}-{} ({} pending)", wins, losses, voids, pending);
    println!("Realized profit: {}", realized_profit(&bets));
    if let Some(rate) = win_rate(&bets) {
        println!("Win rate: {:.1}%", rate * 100.0);
    }
    if let Some(profile) = store.get_profile(user_id).await? {
        let unit = profile.unit_size();
        if unit > Decimal::ZERO {
            println!("Profit in units: {}", (realized_profit(&bets) / unit).round_dp(2));
        }
    }
    Ok(())
}

async fn run_sync_players(
    store: &JournalStore,
    client: &StatsClient,
    search: &str,
    season: i32,
) -> Result<()> {
    let api_players = client.get_players(search).await?;
    if api_players.is_empty() {
        println!("No players matched '{}'", search);
        return Ok(());
    }

    let players: Vec<_> = api_players
        .iter()
        .map(|p| stakebook::domain::Player {
            id: p.id,
            full_name: p.full_name(),
            team_abbreviation: p.team.as_ref().map(|t| t.abbreviation.clone()),
            position: p.position.clone(),
        })
        .collect();
    store.upsert_players(&players).await?;

    let ids: Vec<i64> = players.iter().map(|p| p.id).collect();
    let averages = client.get_season_averages(season, &ids).await?;
    let label = season_label(season);
    for avg in &averages {
        store
            .upsert_season_average(&PlayerSeasonAverage {
                player_id: avg.player_id,
                season: label.clone(),
                games_played: avg.games_played,
                minutes: avg.minutes_decimal().and_then(Decimal::from_f64),
                pts: avg.pts.and_then(Decimal::from_f64),
                reb: avg.reb.and_then(Decimal::from_f64),
                ast: avg.ast.and_then(Decimal::from_f64),
                stl: avg.stl.and_then(Decimal::from_f64),
                blk: avg.blk.and_then(Decimal::from_f64),
                fg3m: avg.fg3m.and_then(Decimal::from_f64),
                fg_pct: avg.fg_pct.and_then(Decimal::from_f64),
                fg3_pct: avg.fg3_pct.and_then(Decimal::from_f64),
                ft_pct: avg.ft_pct.and_then(Decimal::from_f64),
            })
            .await?;
    }

    info!(
        "Synced {} players and {} season-average rows",
        players.len(),
        averages.len()
    );
    println!("Synced {} players for '{}'", players.len(), search);
    Ok(())
}

async fn run_sync_games(
    store: &JournalStore,
    client: &StatsClient,
    date: chrono::NaiveDate,
) -> Result<()> {
    let lines = client.get_stats_by_date(date).await?;
    if lines.is_empty() {
        println!("No box lines for {}", date);
        return Ok(());
    }

    let players = stats::to_players(&lines);
    store.upsert_players(&players).await?;

    let game_stats = stats::to_player_game_stats(&lines);
    store.upsert_game_stats(&game_stats).await?;
    store.refresh_team_splits().await?;

    println!("Synced {} box lines for {}", game_stats.len(), date);
    Ok(())
}
