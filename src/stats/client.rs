//! Native REST client for the sports-stats provider (no SDK dependency).
//! Endpoints return the typed mirrors from `stats::types`; paged endpoints
//! are drained cursor-by-cursor before returning.

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{AdvancedMetrics, ApiPlayer, GameStatLine, Paged, SeasonAverages};
use crate::config::StatsConfig;
use crate::error::{Result, StakebookError};

#[derive(Clone)]
pub struct StatsClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl StatsClient {
    pub fn new(config: &StatsConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http = Client::builder()
            .user_agent("stakebook-stats-sync/0.1")
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                StakebookError::Internal(format!("failed to build stats HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.http.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StakebookError::StatsApi(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        Ok(response.json::<T>().await?)
    }

    /// Drain a cursor-paged endpoint into a single vector
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        base_query: &[(String, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<i64> = None;

        loop {
            let mut query = base_query.to_vec();
            query.push(("per_page".to_string(), "100".to_string()));
            if let Some(c) = cursor {
                query.push(("cursor".to_string(), c.to_string()));
            }

            let page: Paged<T> = self.get_json(path, &query).await?;
            let next = page.meta.as_ref().and_then(|m| m.next_cursor);
            items.extend(page.data);

            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        debug!("fetched {} rows from {}", items.len(), path);
        Ok(items)
    }

    /// Search players by name fragment
    pub async fn get_players(&self, search: &str) -> Result<Vec<ApiPlayer>> {
        self.get_all_pages("players", &[("search".to_string(), search.to_string())])
            .await
    }

    /// Season averages for a set of players
    pub async fn get_season_averages(
        &self,
        season: i32,
        player_ids: &[i64],
    ) -> Result<Vec<SeasonAverages>> {
        let mut query = vec![("season".to_string(), season.to_string())];
        for id in player_ids {
            query.push(("player_ids[]".to_string(), id.to_string()));
        }
        let page: Paged<SeasonAverages> = self.get_json("season_averages", &query).await?;
        Ok(page.data)
    }

    /// All player box lines for a calendar date
    pub async fn get_stats_by_date(&self, date: NaiveDate) -> Result<Vec<GameStatLine>> {
        self.get_all_pages(
            "stats",
            &[("dates[]".to_string(), date.format("%Y-%m-%d").to_string())],
        )
        .await
    }

    /// Advanced efficiency metrics for a game
    pub async fn get_advanced_metrics(&self, game_id: i64) -> Result<Vec<AdvancedMetrics>> {
        self.get_all_pages(
            "stats/advanced",
            &[("game_ids[]".to_string(), game_id.to_string())],
        )
        .await
    }
}
