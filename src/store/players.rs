use crate::domain::{Player, PlayerGameStats, PlayerSeasonAverage, PlayerTeamStats};
use crate::error::Result;
use chrono::NaiveDate;
use sqlx::Row;
use tracing::{debug, instrument};

use super::JournalStore;

impl JournalStore {
    // ==================== Player caches ====================

    /// Upsert player identity rows in one transaction
    #[instrument(skip(self, players))]
    pub async fn upsert_players(&self, players: &[Player]) -> Result<()> {
        if players.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await?;

        for player in players {
            sqlx::query(
                r#"
                INSERT INTO players (id, full_name, team_abbreviation, position)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE SET
                    full_name = EXCLUDED.full_name,
                    team_abbreviation = EXCLUDED.team_abbreviation,
                    position = EXCLUDED.position
                "#,
            )
            .bind(player.id)
            .bind(&player.full_name)
            .bind(player.team_abbreviation.as_deref())
            .bind(player.position.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Upserted {} players", players.len());
        Ok(())
    }

    pub async fn get_player(&self, player_id: i64) -> Result<Option<Player>> {
        let row = sqlx::query(
            "SELECT id, full_name, team_abbreviation, position FROM players WHERE id = $1",
        )
        .bind(player_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| Player {
            id: r.get("id"),
            full_name: r.get("full_name"),
            team_abbreviation: r.get("team_abbreviation"),
            position: r.get("position"),
        }))
    }

    /// Upsert a season-averages row, keyed (player_id, season)
    pub async fn upsert_season_average(&self, avg: &PlayerSeasonAverage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO player_season_averages (
                player_id, season, games_played, minutes, pts, reb, ast, stl,
                blk, fg3m, fg_pct, fg3_pct, ft_pct
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (player_id, season) DO UPDATE SET
                games_played = EXCLUDED.games_played,
                minutes = EXCLUDED.minutes,
                pts = EXCLUDED.pts,
                reb = EXCLUDED.reb,
                ast = EXCLUDED.ast,
                stl = EXCLUDED.stl,
                blk = EXCLUDED.blk,
                fg3m = EXCLUDED.fg3m,
                fg_pct = EXCLUDED.fg_pct,
                fg3_pct = EXCLUDED.fg3_pct,
                ft_pct = EXCLUDED.ft_pct
            "#,
        )
        .bind(avg.player_id)
        .bind(&avg.season)
        .bind(avg.games_played)
        .bind(avg.minutes)
        .bind(avg.pts)
        .bind(avg.reb)
        .bind(avg.ast)
        .bind(avg.stl)
        .bind(avg.blk)
        .bind(avg.fg3m)
        .bind(avg.fg_pct)
        .bind(avg.fg3_pct)
        .bind(avg.ft_pct)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Upsert a per-opponent split row; a second write for the same
    /// (player_id, team_abbreviation) updates rather than duplicates
    pub async fn upsert_team_stats(&self, stats: &PlayerTeamStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO player_team_stats (
                player_id, team_abbreviation, games_played, pts, reb, ast, stl, blk, fg3m
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (player_id, team_abbreviation) DO UPDATE SET
                games_played = EXCLUDED.games_played,
                pts = EXCLUDED.pts,
                reb = EXCLUDED.reb,
                ast = EXCLUDED.ast,
                stl = EXCLUDED.stl,
                blk = EXCLUDED.blk,
                fg3m = EXCLUDED.fg3m
            "#,
        )
        .bind(stats.player_id)
        .bind(&stats.team_abbreviation)
        .bind(stats.games_played)
        .bind(stats.pts)
        .bind(stats.reb)
        .bind(stats.ast)
        .bind(stats.stl)
        .bind(stats.blk)
        .bind(stats.fg3m)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Batch upsert per-game box lines, keyed (game_id, player_id)
    #[instrument(skip(self, lines))]
    pub async fn upsert_game_stats(&self, lines: &[PlayerGameStats]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO player_game_stats (
                    game_id, player_id, game_date, opponent_abbreviation, minutes,
                    pts, reb, ast, stl, blk, fg3m, turnovers
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (game_id, player_id) DO UPDATE SET
                    game_date = EXCLUDED.game_date,
                    opponent_abbreviation = EXCLUDED.opponent_abbreviation,
                    minutes = EXCLUDED.minutes,
                    pts = EXCLUDED.pts,
                    reb = EXCLUDED.reb,
                    ast = EXCLUDED.ast,
                    stl = EXCLUDED.stl,
                    blk = EXCLUDED.blk,
                    fg3m = EXCLUDED.fg3m,
                    turnovers = EXCLUDED.turnovers
                "#,
            )
            .bind(line.game_id)
            .bind(line.player_id)
            .bind(line.game_date)
            .bind(line.opponent_abbreviation.as_deref())
            .bind(line.minutes.as_deref())
            .bind(line.pts)
            .bind(line.reb)
            .bind(line.ast)
            .bind(line.stl)
            .bind(line.blk)
            .bind(line.fg3m)
            .bind(line.turnovers)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Upserted {} game stat lines", lines.len());
        Ok(())
    }

    /// Recompute per-opponent splits from the cached box lines. Safe to run
    /// after every game sync; existing pairs update in place.
    #[instrument(skip(self))]
    pub async fn refresh_team_splits(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO player_team_stats (
                player_id, team_abbreviation, games_played, pts, reb, ast, stl, blk, fg3m
            )
            SELECT player_id,
                   opponent_abbreviation,
                   COUNT(*)::int,
                   ROUND(AVG(pts)::numeric, 1),
                   ROUND(AVG(reb)::numeric, 1),
                   ROUND(AVG(ast)::numeric, 1),
                   ROUND(AVG(stl)::numeric, 1),
                   ROUND(AVG(blk)::numeric, 1),
                   ROUND(AVG(fg3m)::numeric, 1)
            FROM player_game_stats
            WHERE opponent_abbreviation IS NOT NULL
            GROUP BY player_id, opponent_abbreviation
            ON CONFLICT (player_id, team_abbreviation) DO UPDATE SET
                games_played = EXCLUDED.games_played,
                pts = EXCLUDED.pts,
                reb = EXCLUDED.reb,
                ast = EXCLUDED.ast,
                stl = EXCLUDED.stl,
                blk = EXCLUDED.blk,
                fg3m = EXCLUDED.fg3m
            "#,
        )
        .execute(self.pool())
        .await?;

        debug!("Refreshed {} opponent-split rows", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Most recent game lines for a player, newest first
    pub async fn get_recent_game_stats(
        &self,
        player_id: i64,
        limit: i64,
    ) -> Result<Vec<PlayerGameStats>> {
        let rows = sqlx::query(
            r#"
            SELECT game_id, player_id, game_date, opponent_abbreviation, minutes,
                   pts, reb, ast, stl, blk, fg3m, turnovers
            FROM player_game_stats
            WHERE player_id = $1
            ORDER BY game_date DESC
            LIMIT $2
            "#,
        )
        .bind(player_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(game_stats_from_row).collect())
    }

    /// Game lines in a date window joined with the player's position, used
    /// by the DvP recompute
    pub async fn get_game_stats_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(PlayerGameStats, Option<String>)>> {
        let rows = sqlx::query(
            r#"
            SELECT g.game_id, g.player_id, g.game_date, g.opponent_abbreviation,
                   g.minutes, g.pts, g.reb, g.ast, g.stl, g.blk, g.fg3m,
                   g.turnovers, p.position
            FROM player_game_stats g
            JOIN players p ON p.id = g.player_id
            WHERE g.game_date >= $1 AND g.game_date <= $2
            ORDER BY g.game_date ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|r| (game_stats_from_row(r), r.get("position")))
            .collect())
    }
}

fn game_stats_from_row(row: &sqlx::postgres::PgRow) -> PlayerGameStats {
    PlayerGameStats {
        game_id: row.get("game_id"),
        player_id: row.get("player_id"),
        game_date: row.get("game_date"),
        opponent_abbreviation: row.get("opponent_abbreviation"),
        minutes: row.get("minutes"),
        pts: row.get("pts"),
        reb: row.get("reb"),
        ast: row.get("ast"),
        stl: row.get("stl"),
        blk: row.get("blk"),
        fg3m: row.get("fg3m"),
        turnovers: row.get("turnovers"),
    }
}
