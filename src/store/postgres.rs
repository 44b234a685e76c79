use crate::domain::{
    settle_parlay, Bet, BetFilter, BetResult, BetStatus, BillingCycle, BillingUpdate, MarketType,
    ParlayLeg, Profile, PropSide, SubscriptionTier, UnitMode,
};
use crate::domain::profile::SUPPORTED_CURRENCIES;
use crate::error::{Result, StakebookError};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// PostgreSQL storage for the betting journal
#[derive(Clone)]
pub struct JournalStore {
    pool: PgPool,
}

impl JournalStore {
    /// Create a new store
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a store from an existing connection pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ==================== Users & profiles ====================

    /// Register an auth user; the signup trigger creates the profile row.
    /// Re-registering an existing email returns the existing id.
    #[instrument(skip(self))]
    pub async fn create_user(&self, email: &str) -> Result<Uuid> {
        let row = sqlx::query(
            r#"
            INSERT INTO auth_users (email)
            VALUES (lower($1))
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// Resolve an auth user id by email via the SQL lookup function.
    /// Returns None when the email is unknown.
    pub async fn get_auth_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>> {
        let row = sqlx::query("SELECT get_auth_user_id_by_email($1) AS id")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("id"))
    }

    /// Delete an auth user; profile and bets cascade
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM auth_users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StakebookError::NotFound(format!("auth user {}", user_id)));
        }
        Ok(())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, username, phone, bankroll_amount, bankroll_currency,
                   unit_mode, unit_value, bankroll_set_at, stripe_customer_id,
                   stripe_subscription_id, subscription_tier, billing_cycle,
                   subscription_status, trial_used, created_at, updated_at
            FROM profiles WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(profile_from_row).transpose()
    }

    pub async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, username, phone, bankroll_amount, bankroll_currency,
                   unit_mode, unit_value, bankroll_set_at, stripe_customer_id,
                   stripe_subscription_id, subscription_tier, billing_cycle,
                   subscription_status, trial_used, created_at, updated_at
            FROM profiles WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(profile_from_row).transpose()
    }

    /// Set bankroll configuration and stamp bankroll_set_at
    #[instrument(skip(self))]
    pub async fn update_bankroll(
        &self,
        user_id: Uuid,
        amount: Decimal,
        currency: &str,
        unit_mode: UnitMode,
        unit_value: Decimal,
    ) -> Result<()> {
        if !SUPPORTED_CURRENCIES.contains(&currency) {
            return Err(StakebookError::Validation(format!(
                "unsupported currency: {}",
                currency
            )));
        }
        if amount < Decimal::ZERO || unit_value <= Decimal::ZERO {
            return Err(StakebookError::Validation(
                "bankroll must be non-negative and unit value positive".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                bankroll_amount = $2,
                bankroll_currency = $3,
                unit_mode = $4,
                unit_value = $5,
                bankroll_set_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(currency)
        .bind(unit_mode.as_str())
        .bind(unit_value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StakebookError::NotFound(format!("profile {}", user_id)));
        }
        Ok(())
    }

    /// Apply a partial billing update; absent fields keep their value
    #[instrument(skip(self, update))]
    pub async fn update_billing(&self, user_id: Uuid, update: &BillingUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                stripe_customer_id = COALESCE($2, stripe_customer_id),
                stripe_subscription_id = COALESCE($3, stripe_subscription_id),
                subscription_tier = COALESCE($4, subscription_tier),
                billing_cycle = COALESCE($5, billing_cycle),
                subscription_status = COALESCE($6, subscription_status)
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(update.stripe_customer_id.as_deref())
        .bind(update.stripe_subscription_id.as_deref())
        .bind(update.subscription_tier.map(|t| t.as_str()))
        .bind(update.billing_cycle.map(|c| c.as_str()))
        .bind(update.subscription_status.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StakebookError::NotFound(format!("profile {}", user_id)));
        }
        Ok(())
    }

    pub async fn mark_trial_used(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE profiles SET trial_used = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== Bets ====================

    /// Insert a bet
    #[instrument(skip(self, bet))]
    pub async fn insert_bet(&self, bet: &Bet) -> Result<Uuid> {
        let legs_json = bet
            .parlay_legs
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row = sqlx::query(
            r#"
            INSERT INTO bets (
                user_id, sport, market, selection, stake, currency, odds,
                result, status, player_id, player_name, stat_type, line, side,
                actual_value, parlay_legs, placed_at, settled_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id
            "#,
        )
        .bind(bet.user_id)
        .bind(&bet.sport)
        .bind(bet.market.as_str())
        .bind(&bet.selection)
        .bind(bet.stake)
        .bind(&bet.currency)
        .bind(bet.odds)
        .bind(bet.result.as_str())
        .bind(bet.status.as_str())
        .bind(bet.player_id)
        .bind(bet.player_name.as_deref())
        .bind(bet.stat_type.as_deref())
        .bind(bet.line)
        .bind(bet.side.map(|s| s.as_str()))
        .bind(bet.actual_value)
        .bind(legs_json)
        .bind(bet.placed_at)
        .bind(bet.settled_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// Batch insert bets in one transaction
    pub async fn insert_bets(&self, bets: &[Bet]) -> Result<()> {
        if bets.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for bet in bets {
            let legs_json = bet
                .parlay_legs
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?;

            sqlx::query(
                r#"
                INSERT INTO bets (
                    user_id, sport, market, selection, stake, currency, odds,
                    result, status, player_id, player_name, stat_type, line, side,
                    actual_value, parlay_legs, placed_at, settled_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
                "#,
            )
            .bind(bet.user_id)
            .bind(&bet.sport)
            .bind(bet.market.as_str())
            .bind(&bet.selection)
            .bind(bet.stake)
            .bind(&bet.currency)
            .bind(bet.odds)
            .bind(bet.result.as_str())
            .bind(bet.status.as_str())
            .bind(bet.player_id)
            .bind(bet.player_name.as_deref())
            .bind(bet.stat_type.as_deref())
            .bind(bet.line)
            .bind(bet.side.map(|s| s.as_str()))
            .bind(bet.actual_value)
            .bind(legs_json)
            .bind(bet.placed_at)
            .bind(bet.settled_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Inserted {} bets", bets.len());
        Ok(())
    }

    pub async fn get_bet(&self, id: Uuid) -> Result<Option<Bet>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, sport, market, selection, stake, currency, odds,
                   result, status, player_id, player_name, stat_type, line, side,
                   actual_value, parlay_legs, placed_at, settled_at
            FROM bets WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(bet_from_row).transpose()
    }

    /// Journal listing, newest first
    pub async fn list_bets(&self, user_id: Uuid, filter: &BetFilter) -> Result<Vec<Bet>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, sport, market, selection, stake, currency, odds,
                   result, status, player_id, player_name, stat_type, line, side,
                   actual_value, parlay_legs, placed_at, settled_at
            FROM bets
            WHERE user_id = $1
              AND ($2::text IS NULL OR sport = $2)
              AND ($3::text IS NULL OR result = $3)
              AND ($4::timestamptz IS NULL OR placed_at >= $4)
              AND ($5::timestamptz IS NULL OR placed_at <= $5)
            ORDER BY placed_at DESC
            LIMIT $6
            "#,
        )
        .bind(user_id)
        .bind(filter.sport.as_deref())
        .bind(filter.result.map(|r| r.as_str()))
        .bind(filter.since)
        .bind(filter.until)
        .bind(filter.limit.unwrap_or(100))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(bet_from_row).collect()
    }

    /// Settle a bet. For parlays the requested result must match the AND of
    /// the stored leg outcomes.
    #[instrument(skip(self))]
    pub async fn settle_bet(
        &self,
        id: Uuid,
        result: BetResult,
        actual_value: Option<Decimal>,
    ) -> Result<Bet> {
        if result == BetResult::Pending {
            return Err(StakebookError::Validation(
                "cannot settle a bet to pending".to_string(),
            ));
        }

        let bet = self
            .get_bet(id)
            .await?
            .ok_or_else(|| StakebookError::NotFound(format!("bet {}", id)))?;

        if let Some(legs) = &bet.parlay_legs {
            let implied = settle_parlay(legs);
            if result != BetResult::Void && implied != result {
                return Err(StakebookError::Validation(format!(
                    "parlay legs imply {} but settle requested {}",
                    implied, result
                )));
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE bets SET
                result = $2,
                status = 'settled',
                actual_value = COALESCE($3, actual_value),
                settled_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, sport, market, selection, stake, currency, odds,
                      result, status, player_id, player_name, stat_type, line, side,
                      actual_value, parlay_legs, placed_at, settled_at
            "#,
        )
        .bind(id)
        .bind(result.as_str())
        .bind(actual_value)
        .fetch_one(&self.pool)
        .await?;

        bet_from_row(row)
    }

    /// Remove every bet belonging to one user. Deliberately scoped: the only
    /// destructive operation the journal exposes.
    #[instrument(skip(self))]
    pub async fn delete_bets_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM bets WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("Deleted {} bets for user {}", result.rows_affected(), user_id);
        Ok(result.rows_affected())
    }
}

fn profile_from_row(row: PgRow) -> Result<Profile> {
    let unit_mode: String = row.get("unit_mode");
    let tier: String = row.get("subscription_tier");
    let cycle: Option<String> = row.get("billing_cycle");

    Ok(Profile {
        id: row.get("id"),
        name: row.get("name"),
        username: row.get("username"),
        phone: row.get("phone"),
        bankroll_amount: row.get("bankroll_amount"),
        bankroll_currency: row.get("bankroll_currency"),
        unit_mode: UnitMode::try_from(unit_mode.as_str()).map_err(StakebookError::Validation)?,
        unit_value: row.get("unit_value"),
        bankroll_set_at: row.get("bankroll_set_at"),
        stripe_customer_id: row.get("stripe_customer_id"),
        stripe_subscription_id: row.get("stripe_subscription_id"),
        subscription_tier: SubscriptionTier::try_from(tier.as_str())
            .map_err(StakebookError::Validation)?,
        billing_cycle: cycle
            .as_deref()
            .map(BillingCycle::try_from)
            .transpose()
            .map_err(StakebookError::Validation)?,
        subscription_status: row.get("subscription_status"),
        trial_used: row.get("trial_used"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn bet_from_row(row: PgRow) -> Result<Bet> {
    let market: String = row.get("market");
    let result: String = row.get("result");
    let status: String = row.get("status");
    let side: Option<String> = row.get("side");
    let legs: Option<serde_json::Value> = row.get("parlay_legs");

    let parlay_legs: Option<Vec<ParlayLeg>> = legs.map(serde_json::from_value).transpose()?;

    Ok(Bet {
        id: Some(row.get("id")),
        user_id: row.get("user_id"),
        sport: row.get("sport"),
        market: MarketType::try_from(market.as_str()).map_err(StakebookError::Validation)?,
        selection: row.get("selection"),
        stake: row.get("stake"),
        currency: row.get("currency"),
        odds: row.get("odds"),
        result: BetResult::try_from(result.as_str()).map_err(StakebookError::Validation)?,
        status: BetStatus::try_from(status.as_str()).map_err(StakebookError::Validation)?,
        player_id: row.get("player_id"),
        player_name: row.get("player_name"),
        stat_type: row.get("stat_type"),
        line: row.get("line"),
        side: side
            .as_deref()
            .map(PropSide::try_from)
            .transpose()
            .map_err(StakebookError::Validation)?,
        actual_value: row.get("actual_value"),
        parlay_legs,
        placed_at: row.get("placed_at"),
        settled_at: row.get("settled_at"),
    })
}

