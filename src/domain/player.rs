use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cached player identity row, keyed by the upstream player id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub full_name: String,
    pub team_abbreviation: Option<String>,
    pub position: Option<String>,
}

/// Per-season averages cache, UNIQUE (player_id, season)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSeasonAverage {
    pub player_id: i64,
    pub season: String,
    pub games_played: i32,
    pub minutes: Option<Decimal>,
    pub pts: Option<Decimal>,
    pub reb: Option<Decimal>,
    pub ast: Option<Decimal>,
    pub stl: Option<Decimal>,
    pub blk: Option<Decimal>,
    pub fg3m: Option<Decimal>,
    pub fg_pct: Option<Decimal>,
    pub fg3_pct: Option<Decimal>,
    pub ft_pct: Option<Decimal>,
}

/// Per-opponent averages cache, UNIQUE (player_id, team_abbreviation).
/// team_abbreviation names the opponent the splits are measured against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTeamStats {
    pub player_id: i64,
    pub team_abbreviation: String,
    pub games_played: i32,
    pub pts: Option<Decimal>,
    pub reb: Option<Decimal>,
    pub ast: Option<Decimal>,
    pub stl: Option<Decimal>,
    pub blk: Option<Decimal>,
    pub fg3m: Option<Decimal>,
}

/// Per-game box line cache, UNIQUE (game_id, player_id).
/// Minutes keep the upstream "MM:SS" string form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerGameStats {
    pub game_id: i64,
    pub player_id: i64,
    pub game_date: NaiveDate,
    pub opponent_abbreviation: Option<String>,
    pub minutes: Option<String>,
    pub pts: Option<i32>,
    pub reb: Option<i32>,
    pub ast: Option<i32>,
    pub stl: Option<i32>,
    pub blk: Option<i32>,
    pub fg3m: Option<i32>,
    pub turnovers: Option<i32>,
}

impl PlayerGameStats {
    /// Value of one statistical category for this game
    pub fn metric_value(&self, metric: crate::domain::Metric) -> i32 {
        use crate::domain::Metric;
        match metric {
            Metric::Pts => self.pts.unwrap_or(0),
            Metric::Reb => self.reb.unwrap_or(0),
            Metric::Ast => self.ast.unwrap_or(0),
            Metric::Fg3m => self.fg3m.unwrap_or(0),
            Metric::Stl => self.stl.unwrap_or(0),
            Metric::Blk => self.blk.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metric;

    #[test]
    fn test_metric_value_defaults_to_zero() {
        let line = PlayerGameStats {
            game_id: 4821,
            player_id: 237,
            game_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            opponent_abbreviation: Some("MIL".to_string()),
            minutes: Some("36:12".to_string()),
            pts: Some(31),
            reb: Some(5),
            ast: None,
            stl: Some(2),
            blk: None,
            fg3m: Some(4),
            turnovers: Some(3),
        };
        assert_eq!(line.metric_value(Metric::Pts), 31);
        assert_eq!(line.metric_value(Metric::Ast), 0);
        assert_eq!(line.metric_value(Metric::Fg3m), 4);
    }
}
