use crate::domain::{LatestLine, LineChange, LineDirection, LineMovementEvent, LineObservation};
use crate::error::{Result, StakebookError};
use sqlx::Row;
use tracing::{debug, instrument};

use super::JournalStore;

impl JournalStore {
    // ==================== Line movement ====================

    /// Ingest one bookmaker observation. The latest row is always upserted;
    /// an event is appended only when the line actually moved. Returns the
    /// change when one was logged.
    #[instrument(skip(self, obs), fields(player_id = obs.player_id, market = %obs.market, bookmaker = %obs.bookmaker))]
    pub async fn record_observation(&self, obs: &LineObservation) -> Result<Option<LineChange>> {
        let mut tx = self.pool().begin().await?;

        // Raw capture first so charting keeps every observation
        sqlx::query(
            r#"
            INSERT INTO odds_snapshots (player_id, market, bookmaker, line, over_odds, under_odds, captured_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(obs.player_id)
        .bind(&obs.market)
        .bind(&obs.bookmaker)
        .bind(obs.line)
        .bind(obs.over_odds)
        .bind(obs.under_odds)
        .bind(obs.observed_at)
        .execute(&mut *tx)
        .await?;

        let previous = sqlx::query(
            r#"
            SELECT player_id, market, bookmaker, current_line, current_over_odds,
                   current_under_odds, opening_line, last_changed_at, observed_at
            FROM line_movement_latest
            WHERE player_id = $1 AND market = $2 AND bookmaker = $3
            "#,
        )
        .bind(obs.player_id)
        .bind(&obs.market)
        .bind(&obs.bookmaker)
        .fetch_optional(&mut *tx)
        .await?
        .map(|r| LatestLine {
            player_id: r.get("player_id"),
            market: r.get("market"),
            bookmaker: r.get("bookmaker"),
            current_line: r.get("current_line"),
            current_over_odds: r.get("current_over_odds"),
            current_under_odds: r.get("current_under_odds"),
            opening_line: r.get("opening_line"),
            last_changed_at: r.get("last_changed_at"),
            observed_at: r.get("observed_at"),
        });

        let change = match &previous {
            Some(latest) => latest.detect_change(obs),
            None => None,
        };

        // last_changed_at advances only on a change (or first sighting)
        sqlx::query(
            r#"
            INSERT INTO line_movement_latest (
                player_id, market, bookmaker, current_line, current_over_odds,
                current_under_odds, opening_line, last_changed_at, observed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $4, $7, $7)
            ON CONFLICT (player_id, market, bookmaker) DO UPDATE SET
                current_line = EXCLUDED.current_line,
                current_over_odds = EXCLUDED.current_over_odds,
                current_under_odds = EXCLUDED.current_under_odds,
                last_changed_at = CASE
                    WHEN line_movement_latest.current_line <> EXCLUDED.current_line
                    THEN EXCLUDED.observed_at
                    ELSE line_movement_latest.last_changed_at
                END,
                observed_at = EXCLUDED.observed_at
            "#,
        )
        .bind(obs.player_id)
        .bind(&obs.market)
        .bind(&obs.bookmaker)
        .bind(obs.line)
        .bind(obs.over_odds)
        .bind(obs.under_odds)
        .bind(obs.observed_at)
        .execute(&mut *tx)
        .await?;

        if let Some(change) = &change {
            sqlx::query(
                r#"
                INSERT INTO line_movement_events (
                    player_id, market, bookmaker, previous_line, new_line,
                    previous_over_odds, new_over_odds, previous_under_odds,
                    new_under_odds, direction, changed_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(obs.player_id)
            .bind(&obs.market)
            .bind(&obs.bookmaker)
            .bind(change.previous_line)
            .bind(change.new_line)
            .bind(change.previous_over_odds)
            .bind(change.new_over_odds)
            .bind(change.previous_under_odds)
            .bind(change.new_under_odds)
            .bind(change.direction.as_str())
            .bind(change.changed_at)
            .execute(&mut *tx)
            .await?;

            debug!(
                "Line moved {} -> {} ({})",
                change.previous_line,
                change.new_line,
                change.direction.as_str()
            );
        }

        tx.commit().await?;
        Ok(change)
    }

    /// Current state for one (player, market, bookmaker) key
    pub async fn get_latest_line(
        &self,
        player_id: i64,
        market: &str,
        bookmaker: &str,
    ) -> Result<Option<LatestLine>> {
        let row = sqlx::query(
            r#"
            SELECT player_id, market, bookmaker, current_line, current_over_odds,
                   current_under_odds, opening_line, last_changed_at, observed_at
            FROM line_movement_latest
            WHERE player_id = $1 AND market = $2 AND bookmaker = $3
            "#,
        )
        .bind(player_id)
        .bind(market)
        .bind(bookmaker)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| LatestLine {
            player_id: r.get("player_id"),
            market: r.get("market"),
            bookmaker: r.get("bookmaker"),
            current_line: r.get("current_line"),
            current_over_odds: r.get("current_over_odds"),
            current_under_odds: r.get("current_under_odds"),
            opening_line: r.get("opening_line"),
            last_changed_at: r.get("last_changed_at"),
            observed_at: r.get("observed_at"),
        }))
    }

    /// Current state across bookmakers for one (player, market)
    pub async fn list_latest_lines(
        &self,
        player_id: i64,
        market: &str,
    ) -> Result<Vec<LatestLine>> {
        let rows = sqlx::query(
            r#"
            SELECT player_id, market, bookmaker, current_line, current_over_odds,
                   current_under_odds, opening_line, last_changed_at, observed_at
            FROM line_movement_latest
            WHERE player_id = $1 AND market = $2
            ORDER BY bookmaker ASC
            "#,
        )
        .bind(player_id)
        .bind(market)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|r| LatestLine {
                player_id: r.get("player_id"),
                market: r.get("market"),
                bookmaker: r.get("bookmaker"),
                current_line: r.get("current_line"),
                current_over_odds: r.get("current_over_odds"),
                current_under_odds: r.get("current_under_odds"),
                opening_line: r.get("opening_line"),
                last_changed_at: r.get("last_changed_at"),
                observed_at: r.get("observed_at"),
            })
            .collect())
    }

    /// Recent change-log rows for one key, newest first
    pub async fn get_movement_events(
        &self,
        player_id: i64,
        market: &str,
        bookmaker: &str,
        limit: i64,
    ) -> Result<Vec<LineMovementEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, player_id, market, bookmaker, previous_line, new_line,
                   direction, changed_at
            FROM line_movement_events
            WHERE player_id = $1 AND market = $2 AND bookmaker = $3
            ORDER BY changed_at DESC
            LIMIT $4
            "#,
        )
        .bind(player_id)
        .bind(market)
        .bind(bookmaker)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|r| {
                let direction: String = r.get("direction");
                Ok(LineMovementEvent {
                    id: r.get("id"),
                    player_id: r.get("player_id"),
                    market: r.get("market"),
                    bookmaker: r.get("bookmaker"),
                    previous_line: r.get("previous_line"),
                    new_line: r.get("new_line"),
                    direction: LineDirection::try_from(direction.as_str())
                        .map_err(StakebookError::Validation)?,
                    changed_at: r.get("changed_at"),
                })
            })
            .collect()
    }
}
