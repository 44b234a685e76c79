//! Typed mirrors of the upstream sports-stats API plus the REST client
//! used by the cache-sync command. Field names and casing follow the
//! provider's payloads exactly; application code should not re-map them.

pub mod client;
pub mod types;

pub use client::StatsClient;
pub use types::{
    AdvancedMetrics, ApiGame, ApiPlayer, ApiTeam, GameStatLine, Paged, PassingTracking,
    ReboundingTracking, SeasonAverages,
};

use crate::domain::{Player, PlayerGameStats};
use std::collections::HashMap;

/// Convert raw box lines into cache rows. The upstream payload does not name
/// the opponent directly, so it is recovered from the other team appearing
/// under the same game id.
pub fn to_player_game_stats(lines: &[GameStatLine]) -> Vec<PlayerGameStats> {
    // (game_id, team_id) -> opponent abbreviation
    let mut opponents: HashMap<(i64, i64), String> = HashMap::new();
    for line in lines {
        for other in lines {
            if other.game.id == line.game.id && other.team.id != line.team.id {
                opponents.insert(
                    (line.game.id, line.team.id),
                    other.team.abbreviation.clone(),
                );
                break;
            }
        }
    }

    lines
        .iter()
        .map(|line| PlayerGameStats {
            game_id: line.game.id,
            player_id: line.player.id,
            game_date: line.game.date,
            opponent_abbreviation: opponents.get(&(line.game.id, line.team.id)).cloned(),
            minutes: line.min.clone(),
            pts: line.pts.map(|v| v as i32),
            reb: line.reb.map(|v| v as i32),
            ast: line.ast.map(|v| v as i32),
            stl: line.stl.map(|v| v as i32),
            blk: line.blk.map(|v| v as i32),
            fg3m: line.fg3m.map(|v| v as i32),
            turnovers: line.turnover.map(|v| v as i32),
        })
        .collect()
}

/// Player identity rows implied by a batch of box lines, deduplicated
pub fn to_players(lines: &[GameStatLine]) -> Vec<Player> {
    let mut seen: HashMap<i64, Player> = HashMap::new();
    for line in lines {
        seen.entry(line.player.id).or_insert_with(|| Player {
            id: line.player.id,
            full_name: line.player.full_name(),
            team_abbreviation: Some(line.team.abbreviation.clone()),
            position: line.player.position.clone(),
        });
    }
    let mut players: Vec<Player> = seen.into_values().collect();
    players.sort_by_key(|p| p.id);
    players
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::types::{ApiGame, ApiPlayer, ApiTeam};
    use chrono::NaiveDate;

    fn line(game_id: i64, team: &str, team_id: i64, player_id: i64, pts: f64) -> GameStatLine {
        GameStatLine {
            id: player_id * 10 + game_id,
            min: Some("32:00".to_string()),
            fgm: None,
            fga: None,
            fg3m: Some(2.0),
            fg3a: None,
            ftm: None,
            fta: None,
            oreb: None,
            dreb: None,
            reb: Some(6.0),
            ast: Some(4.0),
            stl: Some(1.0),
            blk: Some(0.0),
            turnover: Some(2.0),
            pf: None,
            pts: Some(pts),
            player: ApiPlayer {
                id: player_id,
                first_name: "Test".to_string(),
                last_name: format!("Player{}", player_id),
                position: Some("G".to_string()),
                height: None,
                weight: None,
                jersey_number: None,
                college: None,
                country: None,
                draft_year: None,
                team: None,
            },
            team: ApiTeam {
                id: team_id,
                conference: None,
                division: None,
                city: "Test".to_string(),
                name: team.to_string(),
                full_name: format!("Test {}", team),
                abbreviation: team.to_string(),
            },
            game: ApiGame {
                id: game_id,
                date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
                season: 2025,
                status: None,
                postseason: false,
                home_team_id: 1,
                visitor_team_id: 2,
                home_team_score: None,
                visitor_team_score: None,
            },
        }
    }

    #[test]
    fn test_opponent_recovered_from_same_game() {
        let lines = vec![
            line(9001, "BOS", 2, 100, 25.0),
            line(9001, "MIL", 15, 200, 31.0),
        ];
        let stats = to_player_game_stats(&lines);
        assert_eq!(stats[0].opponent_abbreviation.as_deref(), Some("MIL"));
        assert_eq!(stats[1].opponent_abbreviation.as_deref(), Some("BOS"));
        assert_eq!(stats[0].pts, Some(25));
    }

    #[test]
    fn test_players_deduplicated() {
        let lines = vec![
            line(9001, "BOS", 2, 100, 25.0),
            line(9002, "BOS", 2, 100, 18.0),
        ];
        let players = to_players(&lines);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].id, 100);
    }
}
