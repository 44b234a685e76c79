pub mod bet;
pub mod dvp;
pub mod line;
pub mod player;
pub mod profile;

pub use bet::{
    realized_profit, settle_parlay, win_rate, Bet, BetFilter, BetResult, BetStatus, MarketType,
    ParlayLeg, PropSide,
};
pub use dvp::{
    latest_per_team, position_bucket, season_label, DvpSnapshot, Metric, Position, TEAM_ABBREVIATIONS,
};
pub use line::{LatestLine, LineChange, LineDirection, LineMovementEvent, LineObservation};
pub use player::{Player, PlayerGameStats, PlayerSeasonAverage, PlayerTeamStats};
pub use profile::{BillingCycle, BillingUpdate, Profile, SubscriptionTier, UnitMode};
