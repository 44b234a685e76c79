use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The 30 NBA team abbreviations with their upstream team ids
pub const TEAM_ABBREVIATIONS: &[(&str, i64)] = &[
    ("ATL", 1610612737),
    ("BOS", 1610612738),
    ("BKN", 1610612751),
    ("CHA", 1610612766),
    ("CHI", 1610612741),
    ("CLE", 1610612739),
    ("DAL", 1610612742),
    ("DEN", 1610612743),
    ("DET", 1610612765),
    ("GSW", 1610612744),
    ("HOU", 1610612745),
    ("IND", 1610612754),
    ("LAC", 1610612746),
    ("LAL", 1610612747),
    ("MEM", 1610612763),
    ("MIA", 1610612748),
    ("MIL", 1610612749),
    ("MIN", 1610612750),
    ("NOP", 1610612740),
    ("NYK", 1610612752),
    ("OKC", 1610612760),
    ("ORL", 1610612753),
    ("PHI", 1610612755),
    ("PHX", 1610612756),
    ("POR", 1610612757),
    ("SAC", 1610612758),
    ("SAS", 1610612759),
    ("TOR", 1610612761),
    ("UTA", 1610612762),
    ("WAS", 1610612764),
];

pub fn team_id_for(abbreviation: &str) -> Option<i64> {
    TEAM_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == abbreviation)
        .map(|(_, id)| *id)
}

pub fn abbreviation_for(team_id: i64) -> Option<&'static str> {
    TEAM_ABBREVIATIONS
        .iter()
        .find(|(_, id)| *id == team_id)
        .map(|(abbr, _)| *abbr)
}

/// Season label in the upstream format, e.g. 2025 -> "2025-26"
pub fn season_label(start_year: i32) -> String {
    format!("{}-{:02}", start_year, (start_year + 1) % 100)
}

/// Position bucket a defense is ranked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PG,
        Position::SG,
        Position::SF,
        Position::PF,
        Position::C,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
        }
    }
}

impl TryFrom<&str> for Position {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "PG" => Ok(Position::PG),
            "SG" => Ok(Position::SG),
            "SF" => Ok(Position::SF),
            "PF" => Ok(Position::PF),
            "C" => Ok(Position::C),
            other => Err(format!("unknown position: {}", other)),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Statistical category a DvP rank is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Pts,
    Reb,
    Ast,
    Fg3m,
    Stl,
    Blk,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Pts => "pts",
            Metric::Reb => "reb",
            Metric::Ast => "ast",
            Metric::Fg3m => "fg3m",
            Metric::Stl => "stl",
            Metric::Blk => "blk",
        }
    }
}

impl TryFrom<&str> for Metric {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pts" => Ok(Metric::Pts),
            "reb" => Ok(Metric::Reb),
            "ast" => Ok(Metric::Ast),
            "fg3m" => Ok(Metric::Fg3m),
            "stl" => Ok(Metric::Stl),
            "blk" => Ok(Metric::Blk),
            other => Err(format!("unknown metric: {}", other)),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bucket a player into one of the five position groups when no depth chart
/// maps them. Listed guards split PG/SG on playmaking volume, forwards split
/// SF/PF on interior presence, unknowns fall back on rebounding.
pub fn position_bucket(listed_position: &str, ast: f64, reb: f64, blk: f64) -> Position {
    match listed_position.trim().to_uppercase().as_str() {
        "PG" => Position::PG,
        "SG" => Position::SG,
        "SF" => Position::SF,
        "PF" => Position::PF,
        "C" => Position::C,
        "G" => {
            if ast >= 5.0 {
                Position::PG
            } else {
                Position::SG
            }
        }
        "F" => {
            if reb >= 8.0 || blk >= 2.0 {
                Position::PF
            } else {
                Position::SF
            }
        }
        _ => {
            if reb >= 7.0 {
                Position::PF
            } else {
                Position::C
            }
        }
    }
}

/// One per-date ranking row for a (season, position, metric, team) group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DvpSnapshot {
    pub season: String,
    pub position: Position,
    pub metric: Metric,
    pub team_abbreviation: String,
    /// 1 = stingiest defense against this position/metric, 30 = most generous
    pub rank: i32,
    pub value_allowed: Decimal,
    pub sample_games: i32,
    pub snapshot_date: NaiveDate,
}

/// One row per team: the most recent snapshot at or before `as_of`. Teams
/// with no qualifying snapshot are absent. This mirrors the DISTINCT ON
/// query behind get_latest_dvp_snapshots.
pub fn latest_per_team(snapshots: &[DvpSnapshot], as_of: NaiveDate) -> Vec<DvpSnapshot> {
    let mut best: HashMap<&str, &DvpSnapshot> = HashMap::new();
    for snapshot in snapshots {
        if snapshot.snapshot_date > as_of {
            continue;
        }
        match best.get(snapshot.team_abbreviation.as_str()) {
            Some(current) if current.snapshot_date >= snapshot.snapshot_date => {}
            _ => {
                best.insert(snapshot.team_abbreviation.as_str(), snapshot);
            }
        }
    }
    let mut result: Vec<DvpSnapshot> = best.into_values().cloned().collect();
    result.sort_by(|a, b| a.team_abbreviation.cmp(&b.team_abbreviation));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(team: &str, date: NaiveDate, rank: i32) -> DvpSnapshot {
        DvpSnapshot {
            season: "2025-26".to_string(),
            position: Position::PG,
            metric: Metric::Pts,
            team_abbreviation: team.to_string(),
            rank,
            value_allowed: dec!(22.4),
            sample_games: 20,
            snapshot_date: date,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_season_label() {
        assert_eq!(season_label(2025), "2025-26");
        assert_eq!(season_label(1999), "1999-00");
        assert_eq!(season_label(2009), "2009-10");
    }

    #[test]
    fn test_latest_per_team_picks_newer_snapshot() {
        let snapshots = vec![
            snapshot("MIL", date("2026-01-05"), 12),
            snapshot("MIL", date("2026-01-12"), 8),
            snapshot("BOS", date("2026-01-10"), 3),
        ];
        let latest = latest_per_team(&snapshots, date("2026-01-15"));
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].team_abbreviation, "BOS");
        assert_eq!(latest[1].team_abbreviation, "MIL");
        assert_eq!(latest[1].rank, 8);
        assert_eq!(latest[1].snapshot_date, date("2026-01-12"));
    }

    #[test]
    fn test_latest_per_team_ignores_future_snapshots() {
        let snapshots = vec![
            snapshot("MIL", date("2026-01-05"), 12),
            snapshot("MIL", date("2026-01-20"), 8),
        ];
        let latest = latest_per_team(&snapshots, date("2026-01-15"));
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].snapshot_date, date("2026-01-05"));
    }

    #[test]
    fn test_latest_per_team_absent_team_is_absent() {
        let snapshots = vec![snapshot("MIL", date("2026-01-20"), 8)];
        assert!(latest_per_team(&snapshots, date("2026-01-15")).is_empty());
    }

    #[test]
    fn test_position_bucket_guard_split() {
        assert_eq!(position_bucket("G", 7.0, 3.0, 0.0), Position::PG);
        assert_eq!(position_bucket("G", 2.0, 3.0, 0.0), Position::SG);
    }

    #[test]
    fn test_position_bucket_forward_split() {
        assert_eq!(position_bucket("F", 2.0, 9.0, 0.5), Position::PF);
        assert_eq!(position_bucket("F", 2.0, 4.0, 2.5), Position::PF);
        assert_eq!(position_bucket("F", 2.0, 4.0, 0.5), Position::SF);
    }

    #[test]
    fn test_position_bucket_listed_position_wins() {
        assert_eq!(position_bucket("pg", 0.0, 12.0, 3.0), Position::PG);
        assert_eq!(position_bucket("C", 9.0, 2.0, 0.0), Position::C);
    }

    #[test]
    fn test_team_table_complete() {
        assert_eq!(TEAM_ABBREVIATIONS.len(), 30);
        assert_eq!(team_id_for("MIL"), Some(1610612749));
        assert_eq!(abbreviation_for(1610612749), Some("MIL"));
        assert_eq!(team_id_for("SEA"), None);
    }
}
