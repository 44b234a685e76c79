use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currencies accepted for bankroll and stakes
pub const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "CAD", "AUD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Premium => "premium",
        }
    }
}

impl TryFrom<&str> for SubscriptionTier {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "free" => Ok(SubscriptionTier::Free),
            "pro" => Ok(SubscriptionTier::Pro),
            "premium" => Ok(SubscriptionTier::Premium),
            other => Err(format!("unknown subscription tier: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }
}

impl TryFrom<&str> for BillingCycle {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "monthly" => Ok(BillingCycle::Monthly),
            "annual" => Ok(BillingCycle::Annual),
            other => Err(format!("unknown billing cycle: {}", other)),
        }
    }
}

/// How the user sizes one betting unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// unit_value is an absolute amount in the bankroll currency
    Fixed,
    /// unit_value is a percentage of the bankroll
    Percent,
}

impl UnitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitMode::Fixed => "fixed",
            UnitMode::Percent => "percent",
        }
    }
}

impl TryFrom<&str> for UnitMode {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "fixed" => Ok(UnitMode::Fixed),
            "percent" => Ok(UnitMode::Percent),
            other => Err(format!("unknown unit mode: {}", other)),
        }
    }
}

/// One row per user, keyed by the auth user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub bankroll_amount: Decimal,
    pub bankroll_currency: String,
    pub unit_mode: UnitMode,
    pub unit_value: Decimal,
    pub bankroll_set_at: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub billing_cycle: Option<BillingCycle>,
    pub subscription_status: Option<String>,
    pub trial_used: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// One betting unit in the bankroll currency
    pub fn unit_size(&self) -> Decimal {
        match self.unit_mode {
            UnitMode::Fixed => self.unit_value,
            UnitMode::Percent => self.bankroll_amount * self.unit_value / Decimal::from(100),
        }
    }
}

/// Partial billing update applied from Stripe webhook payloads.
/// Only the fields present are written.
#[derive(Debug, Clone, Default)]
pub struct BillingUpdate {
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_tier: Option<SubscriptionTier>,
    pub billing_cycle: Option<BillingCycle>,
    pub subscription_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profile(mode: UnitMode, value: Decimal) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: None,
            username: Some("sharpshooter".to_string()),
            phone: None,
            bankroll_amount: dec!(2000),
            bankroll_currency: "USD".to_string(),
            unit_mode: mode,
            unit_value: value,
            bankroll_set_at: Some(Utc::now()),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            subscription_tier: SubscriptionTier::Free,
            billing_cycle: None,
            subscription_status: None,
            trial_used: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unit_size_fixed() {
        assert_eq!(profile(UnitMode::Fixed, dec!(25)).unit_size(), dec!(25));
    }

    #[test]
    fn test_unit_size_percent_of_bankroll() {
        // 1.5% of a 2000 bankroll
        assert_eq!(profile(UnitMode::Percent, dec!(1.5)).unit_size(), dec!(30));
    }

    #[test]
    fn test_tier_round_trip() {
        for tier in [SubscriptionTier::Free, SubscriptionTier::Pro, SubscriptionTier::Premium] {
            assert_eq!(SubscriptionTier::try_from(tier.as_str()).unwrap(), tier);
        }
    }
}
