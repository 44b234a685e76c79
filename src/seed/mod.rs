//! Demo-account data generator. The original product shipped this as
//! procedural SQL blocks inside migration files; here it is an operational
//! tool that writes through the normal store paths, deterministic under a
//! fixed RNG seed so demo environments are reproducible.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Bet, BetResult, BetStatus, MarketType, ParlayLeg, PropSide, UnitMode};
use crate::error::{Result, StakebookError};
use crate::store::JournalStore;

/// Player pool the generator draws prop bets from
const DEMO_PLAYERS: &[(i64, &str, &str)] = &[
    (237, "LeBron James", "pts"),
    (666786, "Jalen Brunson", "pts"),
    (434, "Giannis Antetokounmpo", "reb"),
    (246, "Nikola Jokic", "ast"),
    (140, "Stephen Curry", "fg3m"),
    (145, "Luka Doncic", "pts"),
    (3547238, "Victor Wembanyama", "blk"),
    (322, "Jayson Tatum", "pts"),
];

/// Shape of the demo history to generate
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub email: String,
    pub bet_count: usize,
    pub days_span: i64,
    /// Win rate steered for the bets before the engineered tail
    pub target_win_rate: f64,
    /// Results of the most recent bets, oldest first, e.g. "WWLWWWLWWW"
    pub tail_pattern: String,
    /// Share of bets generated as parlays
    pub parlay_share: f64,
    pub bankroll: Decimal,
    pub unit_value: Decimal,
    pub rng_seed: u64,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            email: "demo@stakebook.app".to_string(),
            bet_count: 120,
            days_span: 90,
            target_win_rate: 0.56,
            tail_pattern: "WWLWWWLWWW".to_string(),
            parlay_share: 0.15,
            bankroll: dec!(2000),
            unit_value: dec!(25),
            rng_seed: 20260101,
        }
    }
}

/// Parse a W/L pattern string
pub fn parse_pattern(pattern: &str) -> Result<Vec<BetResult>> {
    pattern
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'W' => Ok(BetResult::Win),
            'L' => Ok(BetResult::Loss),
            other => Err(StakebookError::Validation(format!(
                "pattern accepts only W and L, got '{}'",
                other
            ))),
        })
        .collect()
}

/// Result sequence: random body steered toward the target rate, then the
/// engineered tail verbatim as the most recent outcomes
fn generate_results(plan: &SeedPlan, tail: &[BetResult], rng: &mut StdRng) -> Vec<BetResult> {
    let body_len = plan.bet_count.saturating_sub(tail.len());
    let mut results = Vec::with_capacity(plan.bet_count);

    for _ in 0..body_len {
        if rng.gen_bool(plan.target_win_rate.clamp(0.0, 1.0)) {
            results.push(BetResult::Win);
        } else {
            results.push(BetResult::Loss);
        }
    }
    results.extend_from_slice(tail);
    results
}

pub struct DemoSeeder {
    plan: SeedPlan,
}

impl DemoSeeder {
    pub fn new(plan: SeedPlan) -> Self {
        Self { plan }
    }

    /// Build the bet history for a user. Deterministic for a given plan and
    /// `now`; timestamps walk forward across the configured span.
    pub fn generate(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Bet>> {
        let tail = parse_pattern(&self.plan.tail_pattern)?;
        if tail.len() > self.plan.bet_count {
            return Err(StakebookError::Validation(format!(
                "tail pattern ({} bets) longer than bet count {}",
                tail.len(),
                self.plan.bet_count
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.plan.rng_seed);
        let results = generate_results(&self.plan, &tail, &mut rng);
        let span_minutes = self.plan.days_span.max(1) * 24 * 60;
        let start = now - Duration::minutes(span_minutes);
        let step = span_minutes / results.len().max(1) as i64;

        let mut bets = Vec::with_capacity(results.len());
        for (i, result) in results.iter().enumerate() {
            let placed_at = start + Duration::minutes(step * i as i64 + rng.gen_range(0..step.max(2)) / 2);
            let bet = if rng.gen_bool(self.plan.parlay_share.clamp(0.0, 1.0)) {
                self.parlay_bet(user_id, *result, placed_at, &mut rng)
            } else {
                self.prop_bet(user_id, *result, placed_at, &mut rng)
            };
            bets.push(bet);
        }

        Ok(bets)
    }

    fn stake(&self, rng: &mut StdRng) -> Decimal {
        // 1 to 3 whole units
        self.plan.unit_value * Decimal::from(rng.gen_range(1..=3))
    }

    fn prop_odds(rng: &mut StdRng) -> Decimal {
        // Juiced two-way prop prices, 1.80 to 2.00 in cents
        Decimal::from(rng.gen_range(180..=200)) / dec!(100)
    }

    fn prop_bet(
        &self,
        user_id: Uuid,
        result: BetResult,
        placed_at: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> Bet {
        let (player_id, player_name, stat_type) = DEMO_PLAYERS[rng.gen_range(0..DEMO_PLAYERS.len())];
        let line = Decimal::from(rng.gen_range(10..=35)) + dec!(0.5);
        let side = if rng.gen_bool(0.5) {
            PropSide::Over
        } else {
            PropSide::Under
        };
        // Actual value lands on the winning or losing side of the line
        let offset = Decimal::from(rng.gen_range(1..=6));
        let actual = match (result, side) {
            (BetResult::Win, PropSide::Over) | (BetResult::Loss, PropSide::Under) => line + offset,
            _ => line - offset,
        };

        Bet {
            id: None,
            user_id,
            sport: "nba".to_string(),
            market: MarketType::PlayerProp,
            selection: format!("{} {} {} {}", player_name, side.as_str(), line, stat_type),
            stake: self.stake(rng),
            currency: "USD".to_string(),
            odds: Self::prop_odds(rng),
            result,
            status: BetStatus::Settled,
            player_id: Some(player_id),
            player_name: Some(player_name.to_string()),
            stat_type: Some(stat_type.to_string()),
            line: Some(line),
            side: Some(side),
            actual_value: Some(actual),
            parlay_legs: None,
            placed_at,
            settled_at: Some(placed_at + Duration::hours(6)),
        }
    }

    fn parlay_bet(
        &self,
        user_id: Uuid,
        result: BetResult,
        placed_at: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> Bet {
        let leg_count = rng.gen_range(2..=3);
        // A losing parlay needs at least one losing leg
        let losing_leg = if result == BetResult::Loss {
            Some(rng.gen_range(0..leg_count))
        } else {
            None
        };

        let mut legs = Vec::with_capacity(leg_count);
        let mut odds = Decimal::ONE;
        for leg_index in 0..leg_count {
            let (_, player_name, stat_type) = DEMO_PLAYERS[rng.gen_range(0..DEMO_PLAYERS.len())];
            let line = Decimal::from(rng.gen_range(10..=30)) + dec!(0.5);
            let won = match losing_leg {
                Some(loser) if loser == leg_index => false,
                // The other legs of a lost parlay can go either way
                Some(_) => rng.gen_bool(0.6),
                None => true,
            };
            legs.push(ParlayLeg {
                player_name: player_name.to_string(),
                stat_type: stat_type.to_string(),
                line,
                side: if rng.gen_bool(0.5) {
                    PropSide::Over
                } else {
                    PropSide::Under
                },
                won: Some(won),
            });
            odds *= Self::prop_odds(rng);
        }

        let selection = legs
            .iter()
            .map(|leg| format!("{} {} {} {}", leg.player_name, leg.side.as_str(), leg.line, leg.stat_type))
            .collect::<Vec<_>>()
            .join(" / ");

        Bet {
            id: None,
            user_id,
            sport: "nba".to_string(),
            market: MarketType::Parlay,
            selection,
            stake: self.stake(rng),
            currency: "USD".to_string(),
            odds: odds.round_dp(2),
            result,
            status: BetStatus::Settled,
            player_id: None,
            player_name: None,
            stat_type: None,
            line: None,
            side: None,
            actual_value: None,
            parlay_legs: Some(legs),
            placed_at,
            settled_at: Some(placed_at + Duration::hours(6)),
        }
    }

    /// Create the demo account and write its history through the store
    pub async fn run(&self, store: &JournalStore) -> Result<Uuid> {
        let user_id = store.create_user(&self.plan.email).await?;
        store
            .update_bankroll(
                user_id,
                self.plan.bankroll,
                "USD",
                UnitMode::Fixed,
                self.plan.unit_value,
            )
            .await?;

        let bets = self.generate(user_id, Utc::now())?;
        store.insert_bets(&bets).await?;

        info!(
            "Seeded {} bets for demo user {} ({})",
            bets.len(),
            self.plan.email,
            user_id
        );
        Ok(user_id)
    }
}

/// Remove a named demo user and their journal. Fails with NotFound when the
/// email does not resolve.
pub async fn purge_demo_user(store: &JournalStore, email: &str) -> Result<u64> {
    let user_id = store
        .get_auth_user_id_by_email(email)
        .await?
        .ok_or_else(|| StakebookError::NotFound(format!("no auth user for {}", email)))?;

    let removed = store.delete_bets_for_user(user_id).await?;
    store.delete_user(user_id).await?;

    info!("Purged demo user {} ({} bets)", email, removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settle_parlay;

    fn seeder(plan: SeedPlan) -> DemoSeeder {
        DemoSeeder::new(plan)
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_parse_pattern() {
        let pattern = parse_pattern("WwLl").unwrap();
        assert_eq!(
            pattern,
            vec![BetResult::Win, BetResult::Win, BetResult::Loss, BetResult::Loss]
        );
        assert!(parse_pattern("WVL").is_err());
    }

    #[test]
    fn test_generate_is_deterministic_for_seed() {
        let user_id = Uuid::new_v4();
        let a = seeder(SeedPlan::default()).generate(user_id, fixed_now()).unwrap();
        let b = seeder(SeedPlan::default()).generate(user_id, fixed_now()).unwrap();

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.result, y.result);
            assert_eq!(x.stake, y.stake);
            assert_eq!(x.selection, y.selection);
            assert_eq!(x.placed_at, y.placed_at);
        }
    }

    #[test]
    fn test_engineered_tail_is_most_recent() {
        let plan = SeedPlan::default();
        let tail = parse_pattern(&plan.tail_pattern).unwrap();
        let bets = seeder(plan).generate(Uuid::new_v4(), fixed_now()).unwrap();

        let recent: Vec<BetResult> = bets[bets.len() - tail.len()..]
            .iter()
            .map(|b| b.result)
            .collect();
        assert_eq!(recent, tail);

        // placed_at walks forward, so the tail really is the newest slice
        for window in bets.windows(2) {
            assert!(window[0].placed_at <= window[1].placed_at);
        }
    }

    #[test]
    fn test_parlays_satisfy_settlement_invariant() {
        let plan = SeedPlan {
            parlay_share: 1.0,
            ..SeedPlan::default()
        };
        let bets = seeder(plan).generate(Uuid::new_v4(), fixed_now()).unwrap();

        let mut parlays = 0;
        for bet in &bets {
            let legs = bet.parlay_legs.as_ref().expect("all bets are parlays");
            assert_eq!(settle_parlay(legs), bet.result, "legs must imply the parent result");
            assert!(legs.len() >= 2);
            parlays += 1;
        }
        assert_eq!(parlays, bets.len());
    }

    #[test]
    fn test_stakes_are_unit_quantized() {
        let plan = SeedPlan::default();
        let unit = plan.unit_value;
        let bets = seeder(plan).generate(Uuid::new_v4(), fixed_now()).unwrap();

        for bet in &bets {
            let units = bet.stake / unit;
            assert_eq!(units, units.trunc(), "stake {} is not whole units", bet.stake);
            assert!(units >= Decimal::ONE && units <= Decimal::from(3));
        }
    }

    #[test]
    fn test_body_win_rate_near_target() {
        let plan = SeedPlan {
            bet_count: 400,
            tail_pattern: String::new(),
            parlay_share: 0.0,
            ..SeedPlan::default()
        };
        let target = plan.target_win_rate;
        let bets = seeder(plan).generate(Uuid::new_v4(), fixed_now()).unwrap();

        let wins = bets.iter().filter(|b| b.result == BetResult::Win).count();
        let rate = wins as f64 / bets.len() as f64;
        assert!((rate - target).abs() < 0.08, "rate {} too far from {}", rate, target);
    }

    #[test]
    fn test_tail_longer_than_count_rejected() {
        let plan = SeedPlan {
            bet_count: 3,
            tail_pattern: "WWWWW".to_string(),
            ..SeedPlan::default()
        };
        assert!(seeder(plan).generate(Uuid::new_v4(), fixed_now()).is_err());
    }
}
