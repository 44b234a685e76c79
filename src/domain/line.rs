use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a line move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDirection {
    Up,
    Down,
}

impl LineDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineDirection::Up => "up",
            LineDirection::Down => "down",
        }
    }
}

impl TryFrom<&str> for LineDirection {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "up" => Ok(LineDirection::Up),
            "down" => Ok(LineDirection::Down),
            other => Err(format!("unknown line direction: {}", other)),
        }
    }
}

/// One incoming bookmaker observation for a (player, market, bookmaker) key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineObservation {
    pub player_id: i64,
    pub market: String,
    pub bookmaker: String,
    pub line: Decimal,
    pub over_odds: Option<Decimal>,
    pub under_odds: Option<Decimal>,
    pub observed_at: DateTime<Utc>,
}

/// Current-state row for a (player, market, bookmaker) key.
/// `last_changed_at` tracks the last *change*, not the last observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestLine {
    pub player_id: i64,
    pub market: String,
    pub bookmaker: String,
    pub current_line: Decimal,
    pub current_over_odds: Option<Decimal>,
    pub current_under_odds: Option<Decimal>,
    pub opening_line: Decimal,
    pub last_changed_at: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
}

impl LatestLine {
    /// Compare an incoming observation against the stored state. Returns the
    /// change to log when the line moved; an equal line is not a change even
    /// if the odds drifted.
    pub fn detect_change(&self, obs: &LineObservation) -> Option<LineChange> {
        if obs.line == self.current_line {
            return None;
        }
        let direction = if obs.line > self.current_line {
            LineDirection::Up
        } else {
            LineDirection::Down
        };
        Some(LineChange {
            previous_line: self.current_line,
            new_line: obs.line,
            previous_over_odds: self.current_over_odds,
            new_over_odds: obs.over_odds,
            previous_under_odds: self.current_under_odds,
            new_under_odds: obs.under_odds,
            direction,
            changed_at: obs.observed_at,
        })
    }

    /// Net movement since the line opened
    pub fn move_from_open(&self) -> Decimal {
        self.current_line - self.opening_line
    }
}

/// A detected line move, ready to append to the change log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineChange {
    pub previous_line: Decimal,
    pub new_line: Decimal,
    pub previous_over_odds: Option<Decimal>,
    pub new_over_odds: Option<Decimal>,
    pub previous_under_odds: Option<Decimal>,
    pub new_under_odds: Option<Decimal>,
    pub direction: LineDirection,
    pub changed_at: DateTime<Utc>,
}

/// A stored row from the change log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineMovementEvent {
    pub id: i64,
    pub player_id: i64,
    pub market: String,
    pub bookmaker: String,
    pub previous_line: Decimal,
    pub new_line: Decimal,
    pub direction: LineDirection,
    pub changed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn latest(line: Decimal, over: Decimal) -> LatestLine {
        LatestLine {
            player_id: 237,
            market: "pts".to_string(),
            bookmaker: "draftkings".to_string(),
            current_line: line,
            current_over_odds: Some(over),
            current_under_odds: Some(dec!(1.91)),
            opening_line: dec!(26.5),
            last_changed_at: Utc::now(),
            observed_at: Utc::now(),
        }
    }

    fn observation(line: Decimal, over: Decimal) -> LineObservation {
        LineObservation {
            player_id: 237,
            market: "pts".to_string(),
            bookmaker: "draftkings".to_string(),
            line,
            over_odds: Some(over),
            under_odds: Some(dec!(1.91)),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_equal_line_is_not_a_change() {
        let state = latest(dec!(27.5), dec!(1.87));
        assert!(state.detect_change(&observation(dec!(27.5), dec!(1.87))).is_none());
    }

    #[test]
    fn test_equal_line_with_drifted_odds_is_not_a_change() {
        let state = latest(dec!(27.5), dec!(1.87));
        assert!(state.detect_change(&observation(dec!(27.5), dec!(1.80))).is_none());
    }

    #[test]
    fn test_line_move_up() {
        let state = latest(dec!(27.5), dec!(1.87));
        let change = state
            .detect_change(&observation(dec!(28.5), dec!(1.91)))
            .unwrap();
        assert_eq!(change.previous_line, dec!(27.5));
        assert_eq!(change.new_line, dec!(28.5));
        assert_eq!(change.direction, LineDirection::Up);
    }

    #[test]
    fn test_line_move_down() {
        let state = latest(dec!(27.5), dec!(1.87));
        let change = state
            .detect_change(&observation(dec!(26.5), dec!(1.83)))
            .unwrap();
        assert_eq!(change.direction, LineDirection::Down);
    }

    #[test]
    fn test_move_from_open() {
        let state = latest(dec!(28.5), dec!(1.91));
        assert_eq!(state.move_from_open(), dec!(2));
    }
}
