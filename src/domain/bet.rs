use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolution state of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Win,
    Loss,
    Void,
    Pending,
}

impl BetResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetResult::Win => "win",
            BetResult::Loss => "loss",
            BetResult::Void => "void",
            BetResult::Pending => "pending",
        }
    }

    /// Whether the bet has reached a terminal state
    pub fn is_settled(&self) -> bool {
        !matches!(self, BetResult::Pending)
    }
}

impl TryFrom<&str> for BetResult {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "win" => Ok(BetResult::Win),
            "loss" => Ok(BetResult::Loss),
            "void" => Ok(BetResult::Void),
            "pending" => Ok(BetResult::Pending),
            other => Err(format!("unknown bet result: {}", other)),
        }
    }
}

impl std::fmt::Display for BetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow state of a bet row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Open,
    Settled,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Open => "open",
            BetStatus::Settled => "settled",
        }
    }
}

impl TryFrom<&str> for BetStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "open" => Ok(BetStatus::Open),
            "settled" => Ok(BetStatus::Settled),
            other => Err(format!("unknown bet status: {}", other)),
        }
    }
}

/// Market classification for a wager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Moneyline,
    Spread,
    Total,
    PlayerProp,
    Parlay,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Moneyline => "moneyline",
            MarketType::Spread => "spread",
            MarketType::Total => "total",
            MarketType::PlayerProp => "player_prop",
            MarketType::Parlay => "parlay",
        }
    }
}

impl TryFrom<&str> for MarketType {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "moneyline" => Ok(MarketType::Moneyline),
            "spread" => Ok(MarketType::Spread),
            "total" => Ok(MarketType::Total),
            "player_prop" => Ok(MarketType::PlayerProp),
            "parlay" => Ok(MarketType::Parlay),
            other => Err(format!("unknown market type: {}", other)),
        }
    }
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Over/under side of a player-prop line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropSide {
    Over,
    Under,
}

impl PropSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropSide::Over => "over",
            PropSide::Under => "under",
        }
    }

    /// Whether an observed stat value covers this side of the line
    pub fn covers(&self, line: Decimal, actual: Decimal) -> bool {
        match self {
            PropSide::Over => actual > line,
            PropSide::Under => actual < line,
        }
    }
}

impl TryFrom<&str> for PropSide {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "over" => Ok(PropSide::Over),
            "under" => Ok(PropSide::Under),
            other => Err(format!("unknown prop side: {}", other)),
        }
    }
}

/// One constituent wager within a parlay, stored as an ordered JSONB array
/// on the parent bet. `won` is null until the leg resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayLeg {
    pub player_name: String,
    pub stat_type: String,
    pub line: Decimal,
    pub side: PropSide,
    pub won: Option<bool>,
}

/// Parent result implied by a set of parlay legs: the parlay wins only if
/// every leg wins. Any lost leg settles the parlay immediately; until then
/// an unresolved leg keeps it pending.
pub fn settle_parlay(legs: &[ParlayLeg]) -> BetResult {
    if legs.is_empty() {
        return BetResult::Pending;
    }
    if legs.iter().any(|leg| leg.won == Some(false)) {
        return BetResult::Loss;
    }
    if legs.iter().all(|leg| leg.won == Some(true)) {
        return BetResult::Win;
    }
    BetResult::Pending
}

/// One row in the betting journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub sport: String,
    pub market: MarketType,
    pub selection: String,
    pub stake: Decimal,
    pub currency: String,
    /// Decimal (European) odds
    pub odds: Decimal,
    pub result: BetResult,
    pub status: BetStatus,
    pub player_id: Option<i64>,
    pub player_name: Option<String>,
    pub stat_type: Option<String>,
    pub line: Option<Decimal>,
    pub side: Option<PropSide>,
    pub actual_value: Option<Decimal>,
    pub parlay_legs: Option<Vec<ParlayLeg>>,
    pub placed_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Bet {
    /// Net profit at current resolution: win pays stake * (odds - 1),
    /// loss costs the stake, void and pending are flat.
    pub fn profit(&self) -> Decimal {
        match self.result {
            BetResult::Win => self.stake * (self.odds - Decimal::ONE),
            BetResult::Loss => -self.stake,
            BetResult::Void | BetResult::Pending => Decimal::ZERO,
        }
    }

    /// Stake expressed in units of the given unit size
    pub fn stake_units(&self, unit_size: Decimal) -> Option<Decimal> {
        if unit_size <= Decimal::ZERO {
            return None;
        }
        Some(self.stake / unit_size)
    }
}

/// Filter for journal listing queries
#[derive(Debug, Clone, Default)]
pub struct BetFilter {
    pub sport: Option<String>,
    pub result: Option<BetResult>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Realized profit over a slice of journal rows
pub fn realized_profit(bets: &[Bet]) -> Decimal {
    bets.iter().map(Bet::profit).sum()
}

/// Win rate over decided bets only; voids and pendings excluded
pub fn win_rate(bets: &[Bet]) -> Option<f64> {
    let decided = bets
        .iter()
        .filter(|b| matches!(b.result, BetResult::Win | BetResult::Loss))
        .count();
    if decided == 0 {
        return None;
    }
    let wins = bets.iter().filter(|b| b.result == BetResult::Win).count();
    Some(wins as f64 / decided as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(won: Option<bool>) -> ParlayLeg {
        ParlayLeg {
            player_name: "Jalen Brunson".to_string(),
            stat_type: "pts".to_string(),
            line: dec!(27.5),
            side: PropSide::Over,
            won,
        }
    }

    #[test]
    fn test_settle_parlay_all_won() {
        let legs = vec![leg(Some(true)), leg(Some(true)), leg(Some(true))];
        assert_eq!(settle_parlay(&legs), BetResult::Win);
    }

    #[test]
    fn test_settle_parlay_one_lost_settles_early() {
        // A lost leg decides the parlay even with legs still open
        let legs = vec![leg(Some(true)), leg(Some(false)), leg(None)];
        assert_eq!(settle_parlay(&legs), BetResult::Loss);
    }

    #[test]
    fn test_settle_parlay_unresolved_leg_stays_pending() {
        let legs = vec![leg(Some(true)), leg(None)];
        assert_eq!(settle_parlay(&legs), BetResult::Pending);
    }

    #[test]
    fn test_settle_parlay_empty_is_pending() {
        assert_eq!(settle_parlay(&[]), BetResult::Pending);
    }

    #[test]
    fn test_profit_win_loss_void() {
        let mut bet = Bet {
            id: None,
            user_id: Uuid::new_v4(),
            sport: "nba".to_string(),
            market: MarketType::PlayerProp,
            selection: "Jalen Brunson over 27.5 pts".to_string(),
            stake: dec!(50),
            currency: "USD".to_string(),
            odds: dec!(1.91),
            result: BetResult::Win,
            status: BetStatus::Settled,
            player_id: Some(666786),
            player_name: Some("Jalen Brunson".to_string()),
            stat_type: Some("pts".to_string()),
            line: Some(dec!(27.5)),
            side: Some(PropSide::Over),
            actual_value: Some(dec!(31)),
            parlay_legs: None,
            placed_at: Utc::now(),
            settled_at: Some(Utc::now()),
        };

        assert_eq!(bet.profit(), dec!(45.50));

        bet.result = BetResult::Loss;
        assert_eq!(bet.profit(), dec!(-50));

        bet.result = BetResult::Void;
        assert_eq!(bet.profit(), Decimal::ZERO);
    }

    #[test]
    fn test_stake_units() {
        let bet = Bet {
            id: None,
            user_id: Uuid::new_v4(),
            sport: "nba".to_string(),
            market: MarketType::Moneyline,
            selection: "BOS ML".to_string(),
            stake: dec!(75),
            currency: "USD".to_string(),
            odds: dec!(1.65),
            result: BetResult::Pending,
            status: BetStatus::Open,
            player_id: None,
            player_name: None,
            stat_type: None,
            line: None,
            side: None,
            actual_value: None,
            parlay_legs: None,
            placed_at: Utc::now(),
            settled_at: None,
        };

        assert_eq!(bet.stake_units(dec!(25)), Some(dec!(3)));
        assert_eq!(bet.stake_units(Decimal::ZERO), None);
    }

    #[test]
    fn test_prop_side_covers_push_is_neither() {
        // A push (actual == line) covers neither side
        assert!(!PropSide::Over.covers(dec!(27.5), dec!(27.5)));
        assert!(!PropSide::Under.covers(dec!(27.5), dec!(27.5)));
        assert!(PropSide::Over.covers(dec!(27.5), dec!(28)));
        assert!(PropSide::Under.covers(dec!(27.5), dec!(27)));
    }

    #[test]
    fn test_realized_profit_sums_wins_and_losses() {
        let bets = vec![
            bet_fixture(BetResult::Win, dec!(100), dec!(1.91)),
            bet_fixture(BetResult::Loss, dec!(50), dec!(2.10)),
            bet_fixture(BetResult::Void, dec!(25), dec!(1.80)),
        ];
        // 91 - 50 + 0
        assert_eq!(realized_profit(&bets), dec!(41));
    }

    #[test]
    fn test_win_rate_excludes_voids_and_pendings() {
        let bets = vec![
            bet_fixture(BetResult::Win, dec!(10), dec!(2)),
            bet_fixture(BetResult::Loss, dec!(10), dec!(2)),
            bet_fixture(BetResult::Win, dec!(10), dec!(2)),
            bet_fixture(BetResult::Void, dec!(10), dec!(2)),
            bet_fixture(BetResult::Pending, dec!(10), dec!(2)),
        ];
        let rate = win_rate(&bets).unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_win_rate_empty_is_none() {
        assert!(win_rate(&[]).is_none());
        assert!(win_rate(&[bet_fixture(BetResult::Pending, dec!(10), dec!(2))]).is_none());
    }

    fn bet_fixture(result: BetResult, stake: Decimal, odds: Decimal) -> Bet {
        Bet {
            id: None,
            user_id: Uuid::new_v4(),
            sport: "nba".to_string(),
            market: MarketType::Moneyline,
            selection: "fixture".to_string(),
            stake,
            currency: "USD".to_string(),
            odds,
            result,
            status: BetStatus::Settled,
            player_id: None,
            player_name: None,
            stat_type: None,
            line: None,
            side: None,
            actual_value: None,
            parlay_legs: None,
            placed_at: Utc::now(),
            settled_at: None,
        }
    }

    #[test]
    fn test_result_round_trip() {
        for result in [BetResult::Win, BetResult::Loss, BetResult::Void, BetResult::Pending] {
            assert_eq!(BetResult::try_from(result.as_str()).unwrap(), result);
        }
        assert!(BetResult::try_from("push").is_err());
    }

    #[test]
    fn test_parlay_leg_json_shape() {
        let legs = vec![leg(Some(true)), leg(None)];
        let json = serde_json::to_value(&legs).unwrap();
        assert_eq!(json[0]["side"], "over");
        assert_eq!(json[0]["won"], true);
        assert!(json[1]["won"].is_null());
    }
}
