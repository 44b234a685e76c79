use crate::error::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use tracing::{info, instrument};

use super::JournalStore;

/// Cached model output for one (player, stat, date) key
#[derive(Debug, Clone)]
pub struct CachedPrediction {
    pub player_id: i64,
    pub stat_type: String,
    pub game_date: NaiveDate,
    pub payload: serde_json::Value,
    pub expires_at: DateTime<Utc>,
}

/// Manual-entry row: coaching tendencies for one team
#[derive(Debug, Clone)]
pub struct CoachTendency {
    pub coach_name: String,
    pub team_abbreviation: String,
    pub pace_rank: Option<i32>,
    pub minutes_leash: Option<String>,
    pub pulls_starters_in_blowouts: Option<bool>,
    pub notes: Option<String>,
}

/// Manual-entry row: arena context for one team
#[derive(Debug, Clone)]
pub struct ArenaFactor {
    pub team_abbreviation: String,
    pub arena_name: String,
    pub high_altitude: bool,
    pub scoring_factor: Decimal,
}

/// Manual-entry row: referee tendencies
#[derive(Debug, Clone)]
pub struct RefereeStats {
    pub referee_name: String,
    pub fouls_per_game: Option<Decimal>,
    pub over_rate: Option<Decimal>,
    pub games_officiated: i32,
}

impl JournalStore {
    // ==================== Prediction inputs ====================

    /// Store a model payload with a TTL
    #[instrument(skip(self, payload))]
    pub async fn put_prediction(
        &self,
        player_id: i64,
        stat_type: &str,
        game_date: NaiveDate,
        payload: serde_json::Value,
        ttl: Duration,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO prediction_cache (player_id, stat_type, game_date, payload, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (player_id, stat_type, game_date) DO UPDATE SET
                payload = EXCLUDED.payload,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(player_id)
        .bind(stat_type)
        .bind(game_date)
        .bind(sqlx::types::Json(&payload))
        .bind(Utc::now() + ttl)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Fetch a cached prediction, ignoring expired rows
    pub async fn get_prediction(
        &self,
        player_id: i64,
        stat_type: &str,
        game_date: NaiveDate,
    ) -> Result<Option<CachedPrediction>> {
        let row = sqlx::query(
            r#"
            SELECT player_id, stat_type, game_date, payload, expires_at
            FROM prediction_cache
            WHERE player_id = $1 AND stat_type = $2 AND game_date = $3
              AND expires_at > NOW()
            "#,
        )
        .bind(player_id)
        .bind(stat_type)
        .bind(game_date)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| CachedPrediction {
            player_id: r.get("player_id"),
            stat_type: r.get("stat_type"),
            game_date: r.get("game_date"),
            payload: r.get("payload"),
            expires_at: r.get("expires_at"),
        }))
    }

    /// Drop expired cache rows; returns how many were removed
    pub async fn purge_expired_predictions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM prediction_cache WHERE expires_at <= NOW()")
            .execute(self.pool())
            .await?;

        if result.rows_affected() > 0 {
            info!("Purged {} expired prediction rows", result.rows_affected());
        }
        Ok(result.rows_affected())
    }

    pub async fn upsert_coach_tendency(&self, row: &CoachTendency) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO coach_tendencies (
                coach_name, team_abbreviation, pace_rank, minutes_leash,
                pulls_starters_in_blowouts, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (team_abbreviation) DO UPDATE SET
                coach_name = EXCLUDED.coach_name,
                pace_rank = EXCLUDED.pace_rank,
                minutes_leash = EXCLUDED.minutes_leash,
                pulls_starters_in_blowouts = EXCLUDED.pulls_starters_in_blowouts,
                notes = EXCLUDED.notes
            "#,
        )
        .bind(&row.coach_name)
        .bind(&row.team_abbreviation)
        .bind(row.pace_rank)
        .bind(row.minutes_leash.as_deref())
        .bind(row.pulls_starters_in_blowouts)
        .bind(row.notes.as_deref())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn upsert_arena_factor(&self, row: &ArenaFactor) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO arena_factors (team_abbreviation, arena_name, high_altitude, scoring_factor)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (team_abbreviation) DO UPDATE SET
                arena_name = EXCLUDED.arena_name,
                high_altitude = EXCLUDED.high_altitude,
                scoring_factor = EXCLUDED.scoring_factor
            "#,
        )
        .bind(&row.team_abbreviation)
        .bind(&row.arena_name)
        .bind(row.high_altitude)
        .bind(row.scoring_factor)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn upsert_referee_stats(&self, row: &RefereeStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO referee_stats (referee_name, fouls_per_game, over_rate, games_officiated)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (referee_name) DO UPDATE SET
                fouls_per_game = EXCLUDED.fouls_per_game,
                over_rate = EXCLUDED.over_rate,
                games_officiated = EXCLUDED.games_officiated
            "#,
        )
        .bind(&row.referee_name)
        .bind(row.fouls_per_game)
        .bind(row.over_rate)
        .bind(row.games_officiated)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
