use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Paged response envelope used by the list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next_cursor: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTeam {
    pub id: i64,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    pub city: String,
    pub name: String,
    pub full_name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPlayer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub jersey_number: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub draft_year: Option<i32>,
    #[serde(default)]
    pub team: Option<ApiTeam>,
}

impl ApiPlayer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGame {
    pub id: i64,
    pub date: NaiveDate,
    pub season: i32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub postseason: bool,
    pub home_team_id: i64,
    pub visitor_team_id: i64,
    #[serde(default)]
    pub home_team_score: Option<i32>,
    #[serde(default)]
    pub visitor_team_score: Option<i32>,
}

/// Per-season averages payload. Minutes arrive as "MM:SS".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonAverages {
    pub player_id: i64,
    pub season: i32,
    pub games_played: i32,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub fgm: Option<f64>,
    #[serde(default)]
    pub fga: Option<f64>,
    #[serde(default)]
    pub fg3m: Option<f64>,
    #[serde(default)]
    pub fg3a: Option<f64>,
    #[serde(default)]
    pub ftm: Option<f64>,
    #[serde(default)]
    pub fta: Option<f64>,
    #[serde(default)]
    pub oreb: Option<f64>,
    #[serde(default)]
    pub dreb: Option<f64>,
    #[serde(default)]
    pub reb: Option<f64>,
    #[serde(default)]
    pub ast: Option<f64>,
    #[serde(default)]
    pub stl: Option<f64>,
    #[serde(default)]
    pub blk: Option<f64>,
    #[serde(default)]
    pub turnover: Option<f64>,
    #[serde(default)]
    pub pf: Option<f64>,
    #[serde(default)]
    pub pts: Option<f64>,
    #[serde(default)]
    pub fg_pct: Option<f64>,
    #[serde(default)]
    pub fg3_pct: Option<f64>,
    #[serde(default)]
    pub ft_pct: Option<f64>,
}

impl SeasonAverages {
    /// Minutes as a decimal number, parsed from the upstream "MM:SS" form
    pub fn minutes_decimal(&self) -> Option<f64> {
        let min = self.min.as_deref()?;
        match min.split_once(':') {
            Some((m, s)) => {
                let minutes: f64 = m.parse().ok()?;
                let seconds: f64 = s.parse().ok()?;
                Some(minutes + seconds / 60.0)
            }
            None => min.parse().ok(),
        }
    }
}

/// One player box line from the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatLine {
    pub id: i64,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub fgm: Option<f64>,
    #[serde(default)]
    pub fga: Option<f64>,
    #[serde(default)]
    pub fg3m: Option<f64>,
    #[serde(default)]
    pub fg3a: Option<f64>,
    #[serde(default)]
    pub ftm: Option<f64>,
    #[serde(default)]
    pub fta: Option<f64>,
    #[serde(default)]
    pub oreb: Option<f64>,
    #[serde(default)]
    pub dreb: Option<f64>,
    #[serde(default)]
    pub reb: Option<f64>,
    #[serde(default)]
    pub ast: Option<f64>,
    #[serde(default)]
    pub stl: Option<f64>,
    #[serde(default)]
    pub blk: Option<f64>,
    #[serde(default)]
    pub turnover: Option<f64>,
    #[serde(default)]
    pub pf: Option<f64>,
    #[serde(default)]
    pub pts: Option<f64>,
    pub player: ApiPlayer,
    pub team: ApiTeam,
    pub game: ApiGame,
}

/// Passing tracking payload; the tracking endpoints use camelCase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassingTracking {
    pub player_id: i64,
    #[serde(default)]
    pub team_abbreviation: Option<String>,
    pub games_played: i32,
    #[serde(default)]
    pub passes_made: Option<f64>,
    #[serde(default)]
    pub passes_received: Option<f64>,
    #[serde(default)]
    pub assists: Option<f64>,
    #[serde(default)]
    pub secondary_assists: Option<f64>,
    #[serde(default)]
    pub potential_assists: Option<f64>,
    #[serde(default)]
    pub assist_points_created: Option<f64>,
}

/// Rebounding tracking payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReboundingTracking {
    pub player_id: i64,
    pub games_played: i32,
    #[serde(default)]
    pub rebound_chances: Option<f64>,
    #[serde(default)]
    pub rebound_chance_pct: Option<f64>,
    #[serde(default)]
    pub contested_rebounds: Option<f64>,
    #[serde(default)]
    pub contested_rebound_pct: Option<f64>,
    #[serde(default)]
    pub deferred_rebound_chances: Option<f64>,
    #[serde(default)]
    pub avg_rebound_distance: Option<f64>,
}

/// Advanced efficiency metrics payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedMetrics {
    pub player_id: i64,
    #[serde(default)]
    pub game_id: Option<i64>,
    #[serde(default)]
    pub offensive_rating: Option<f64>,
    #[serde(default)]
    pub defensive_rating: Option<f64>,
    #[serde(default)]
    pub net_rating: Option<f64>,
    #[serde(default)]
    pub assist_percentage: Option<f64>,
    #[serde(default)]
    pub usage_percentage: Option<f64>,
    #[serde(default)]
    pub true_shooting_percentage: Option<f64>,
    #[serde(default)]
    pub pace: Option<f64>,
    #[serde(default)]
    pub pie: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_averages_parse() {
        let json = r#"{
            "player_id": 237,
            "season": 2025,
            "games_played": 41,
            "min": "35:06",
            "pts": 27.4,
            "reb": 7.2,
            "ast": 7.9,
            "stl": 1.2,
            "blk": 0.6,
            "fg3m": 2.1,
            "fg_pct": 0.521,
            "fg3_pct": 0.384,
            "ft_pct": 0.756
        }"#;
        let averages: SeasonAverages = serde_json::from_str(json).unwrap();
        assert_eq!(averages.player_id, 237);
        assert_eq!(averages.games_played, 41);
        assert_eq!(averages.pts, Some(27.4));
        let minutes = averages.minutes_decimal().unwrap();
        assert!((minutes - 35.1).abs() < 0.001);
    }

    #[test]
    fn test_tracking_payload_camel_case() {
        let json = r#"{
            "playerId": 237,
            "teamAbbreviation": "LAL",
            "gamesPlayed": 41,
            "passesMade": 62.3,
            "passesReceived": 55.1,
            "potentialAssists": 14.8,
            "assistPointsCreated": 19.6
        }"#;
        let passing: PassingTracking = serde_json::from_str(json).unwrap();
        assert_eq!(passing.player_id, 237);
        assert_eq!(passing.potential_assists, Some(14.8));
        assert_eq!(passing.secondary_assists, None);
    }

    #[test]
    fn test_advanced_metrics_camel_case() {
        let json = r#"{
            "playerId": 237,
            "gameId": 15908525,
            "offensiveRating": 118.2,
            "defensiveRating": 110.7,
            "usagePercentage": 0.312,
            "trueShootingPercentage": 0.634,
            "pace": 99.8,
            "pie": 0.182
        }"#;
        let advanced: AdvancedMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(advanced.net_rating, None);
        assert_eq!(advanced.usage_percentage, Some(0.312));
        assert_eq!(advanced.pie, Some(0.182));
    }

    #[test]
    fn test_paged_stats_parse() {
        let json = r#"{
            "data": [{
                "id": 1,
                "min": "33:12",
                "pts": 22,
                "reb": 11,
                "player": {"id": 237, "first_name": "LeBron", "last_name": "James", "position": "F"},
                "team": {"id": 1610612747, "city": "Los Angeles", "name": "Lakers",
                         "full_name": "Los Angeles Lakers", "abbreviation": "LAL"},
                "game": {"id": 15908525, "date": "2026-01-12", "season": 2025,
                         "home_team_id": 1610612747, "visitor_team_id": 1610612749}
            }],
            "meta": {"next_cursor": 25, "per_page": 25}
        }"#;
        let page: Paged<GameStatLine> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].player.full_name(), "LeBron James");
        assert_eq!(page.data[0].team.abbreviation, "LAL");
        assert_eq!(page.meta.unwrap().next_cursor, Some(25));
    }
}
