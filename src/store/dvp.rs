use crate::domain::{
    position_bucket, season_label, DvpSnapshot, Metric, PlayerGameStats, Position,
};
use crate::error::{Result, StakebookError};
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::Row;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

use super::JournalStore;

/// One row returned by get_latest_dvp_snapshots
#[derive(Debug, Clone)]
pub struct DvpRankRow {
    pub team_abbreviation: String,
    pub rank: i32,
    pub value_allowed: Decimal,
    pub snapshot_date: NaiveDate,
}

impl JournalStore {
    // ==================== DvP snapshots ====================

    /// Upsert ranking snapshots in one transaction
    #[instrument(skip(self, snapshots))]
    pub async fn upsert_dvp_snapshots(&self, snapshots: &[DvpSnapshot]) -> Result<()> {
        if snapshots.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await?;

        for snapshot in snapshots {
            sqlx::query(
                r#"
                INSERT INTO dvp_rank_snapshots (
                    season, position, metric, team_abbreviation, rank,
                    value_allowed, sample_games, snapshot_date
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (season, position, metric, team_abbreviation, snapshot_date)
                DO UPDATE SET
                    rank = EXCLUDED.rank,
                    value_allowed = EXCLUDED.value_allowed,
                    sample_games = EXCLUDED.sample_games
                "#,
            )
            .bind(&snapshot.season)
            .bind(snapshot.position.as_str())
            .bind(snapshot.metric.as_str())
            .bind(&snapshot.team_abbreviation)
            .bind(snapshot.rank)
            .bind(snapshot.value_allowed)
            .bind(snapshot.sample_games)
            .bind(snapshot.snapshot_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// One row per team: the most recent snapshot at or before the game date
    pub async fn get_latest_dvp_snapshots(
        &self,
        season: &str,
        position: Position,
        metric: Metric,
        game_date: NaiveDate,
    ) -> Result<Vec<DvpRankRow>> {
        let rows = sqlx::query("SELECT * FROM get_latest_dvp_snapshots($1, $2, $3, $4)")
            .bind(season)
            .bind(position.as_str())
            .bind(metric.as_str())
            .bind(game_date)
            .fetch_all(self.pool())
            .await?;

        Ok(rows
            .iter()
            .map(|r| DvpRankRow {
                team_abbreviation: r.get("team_abbreviation"),
                rank: r.get("rank"),
                value_allowed: r.get("value_allowed"),
                snapshot_date: r.get("snapshot_date"),
            })
            .collect())
    }

    /// Recompute one day's snapshots for every (position, metric) pair from
    /// the cached box lines and upsert them.
    #[instrument(skip(self))]
    pub async fn rebuild_dvp_for_date(
        &self,
        season_start_year: i32,
        as_of: NaiveDate,
    ) -> Result<usize> {
        let season_start = NaiveDate::from_ymd_opt(season_start_year, 10, 1).ok_or_else(|| {
            StakebookError::Validation(format!("invalid season start year {}", season_start_year))
        })?;
        if as_of < season_start {
            return Err(StakebookError::Validation(format!(
                "{} is before the {} season start",
                as_of,
                season_label(season_start_year)
            )));
        }

        let lines = self.get_game_stats_in_range(season_start, as_of).await?;
        let snapshots = compute_dvp_snapshots(&lines, season_start_year, as_of);
        let count = snapshots.len();
        self.upsert_dvp_snapshots(&snapshots).await?;

        info!(
            "Rebuilt {} DvP snapshot rows for {} as of {}",
            count,
            season_label(season_start_year),
            as_of
        );
        Ok(count)
    }
}

/// Aggregate cached box lines into per-team allowed-per-game values and rank
/// them, one snapshot row per (position, metric, team). A game line for a
/// player contributes to the *opponent's* allowed total for the player's
/// position bucket. Rank 1 allows the least.
pub fn compute_dvp_snapshots(
    lines: &[(PlayerGameStats, Option<String>)],
    season_start_year: i32,
    as_of: NaiveDate,
) -> Vec<DvpSnapshot> {
    let season = season_label(season_start_year);

    // (team, position) -> per-metric totals and the games sampled
    let mut totals: HashMap<(String, Position), [f64; 6]> = HashMap::new();
    let mut games: HashMap<(String, Position), HashSet<i64>> = HashMap::new();

    const METRICS: [Metric; 6] = [
        Metric::Pts,
        Metric::Reb,
        Metric::Ast,
        Metric::Fg3m,
        Metric::Stl,
        Metric::Blk,
    ];

    for (line, listed_position) in lines {
        let Some(team) = line.opponent_abbreviation.clone() else {
            continue;
        };
        let bucket = position_bucket(
            listed_position.as_deref().unwrap_or(""),
            line.ast.unwrap_or(0) as f64,
            line.reb.unwrap_or(0) as f64,
            line.blk.unwrap_or(0) as f64,
        );
        let key = (team, bucket);
        let entry = totals.entry(key.clone()).or_insert([0.0; 6]);
        for (i, metric) in METRICS.iter().enumerate() {
            entry[i] += line.metric_value(*metric) as f64;
        }
        games.entry(key).or_default().insert(line.game_id);
    }

    let mut snapshots = Vec::new();

    for position in Position::ALL {
        for (i, metric) in METRICS.iter().enumerate() {
            // Per-game value allowed by each team against this position
            let mut per_team: Vec<(String, f64, i32)> = totals
                .iter()
                .filter(|((_, bucket), _)| *bucket == position)
                .map(|((team, _), sums)| {
                    let sample = games
                        .get(&(team.clone(), position))
                        .map(|g| g.len())
                        .unwrap_or(0) as i32;
                    let per_game = if sample > 0 {
                        sums[i] / sample as f64
                    } else {
                        0.0
                    };
                    (team.clone(), per_game, sample)
                })
                .collect();

            per_team.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });

            for (rank_index, (team, per_game, sample)) in per_team.into_iter().enumerate() {
                snapshots.push(DvpSnapshot {
                    season: season.clone(),
                    position,
                    metric: *metric,
                    team_abbreviation: team,
                    rank: rank_index as i32 + 1,
                    value_allowed: Decimal::from_f64(per_game)
                        .unwrap_or(Decimal::ZERO)
                        .round_dp(2),
                    sample_games: sample,
                    snapshot_date: as_of,
                });
            }
        }
    }

    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(
        game_id: i64,
        player_id: i64,
        opponent: &str,
        pts: i32,
        reb: i32,
        ast: i32,
    ) -> (PlayerGameStats, Option<String>) {
        (
            PlayerGameStats {
                game_id,
                player_id,
                game_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                opponent_abbreviation: Some(opponent.to_string()),
                minutes: None,
                pts: Some(pts),
                reb: Some(reb),
                ast: Some(ast),
                stl: Some(0),
                blk: Some(0),
                fg3m: Some(0),
                turnovers: None,
            },
            Some("PG".to_string()),
        )
    }

    #[test]
    fn test_compute_dvp_ranks_fewest_allowed_first() {
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        // BOS allows 18 pts to PGs across one game; MIL allows 30
        let lines = vec![
            line(1, 100, "BOS", 18, 3, 6),
            line(2, 101, "MIL", 30, 4, 7),
        ];
        let snapshots = compute_dvp_snapshots(&lines, 2025, as_of);

        let pts_rows: Vec<&DvpSnapshot> = snapshots
            .iter()
            .filter(|s| s.position == Position::PG && s.metric == Metric::Pts)
            .collect();
        assert_eq!(pts_rows.len(), 2);
        assert_eq!(pts_rows[0].team_abbreviation, "BOS");
        assert_eq!(pts_rows[0].rank, 1);
        assert_eq!(pts_rows[1].team_abbreviation, "MIL");
        assert_eq!(pts_rows[1].rank, 2);
        assert_eq!(pts_rows[0].season, "2025-26");
        assert_eq!(pts_rows[0].snapshot_date, as_of);
    }

    #[test]
    fn test_compute_dvp_averages_per_game() {
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        // Two BOS games: 20 and 30 points to PGs -> 25 per game
        let lines = vec![
            line(1, 100, "BOS", 20, 3, 6),
            line(2, 100, "BOS", 30, 3, 6),
        ];
        let snapshots = compute_dvp_snapshots(&lines, 2025, as_of);
        let bos_pts = snapshots
            .iter()
            .find(|s| {
                s.team_abbreviation == "BOS"
                    && s.position == Position::PG
                    && s.metric == Metric::Pts
            })
            .unwrap();
        assert_eq!(bos_pts.value_allowed, Decimal::from(25));
        assert_eq!(bos_pts.sample_games, 2);
    }

    #[test]
    fn test_compute_dvp_two_players_same_game_sum_not_double_counted() {
        let as_of = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        // Two PGs in the same game against BOS: totals sum, game counts once
        let lines = vec![
            line(1, 100, "BOS", 12, 2, 6),
            line(1, 101, "BOS", 8, 2, 5),
        ];
        let snapshots = compute_dvp_snapshots(&lines, 2025, as_of);
        let bos_pts = snapshots
            .iter()
            .find(|s| {
                s.team_abbreviation == "BOS"
                    && s.position == Position::PG
                    && s.metric == Metric::Pts
            })
            .unwrap();
        assert_eq!(bos_pts.value_allowed, Decimal::from(20));
        assert_eq!(bos_pts.sample_games, 1);
    }
}
