// src/state.rs
use chrono::{DateTime, Local};
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::models::{RateTable, SpotPrice, VolatilitySnapshot};
use crate::services::gold::{fetch_spot_price, PriceSource};
use crate::services::history::PriceHistoryStore;
use crate::services::pricing::calculate_rates;
use crate::services::settings::{ConfigStore, ConfigUpdate, ShopConfig};
use crate::services::volatility::volatility_state;

/// Shared state handed to every route.
pub struct AppState {
    pub config_store: ConfigStore,
    pub history: PriceHistoryStore,
    pub price_source: Arc<dyn PriceSource>,
    pub debug: bool,
    /// Last persisted shop config; replaced after every admin update.
    config: RwLock<ShopConfig>,
}

/// Everything a rate computation produced, plus the config it used.
#[derive(Debug, Clone)]
pub struct RateSheet {
    pub spot: SpotPrice,
    pub table: RateTable,
    pub config: ShopConfig,
    pub computed_at: DateTime<Local>,
}

impl AppState {
    pub async fn new(
        config_store: ConfigStore,
        history: PriceHistoryStore,
        price_source: Arc<dyn PriceSource>,
        debug: bool,
    ) -> Self {
        let config = config_store.load().await;
        info!("Loaded shop config for '{}'", config.shop_name);
        AppState {
            config_store,
            history,
            price_source,
            debug,
            config: RwLock::new(config),
        }
    }

    pub async fn from_server_config(server: &ServerConfig, price_source: Arc<dyn PriceSource>) -> Self {
        Self::new(
            ConfigStore::new(server.config_path()),
            PriceHistoryStore::new(server.history_path()),
            price_source,
            server.debug,
        )
        .await
    }

    pub async fn config(&self) -> ShopConfig {
        self.config.read().await.clone()
    }

    /// Persist an admin update and swap the cached config for the saved one.
    /// The cache write lock is held across the save so the cache always ends
    /// up matching the last write to disk.
    pub async fn update_config(&self, update: &ConfigUpdate) -> Result<ShopConfig> {
        let mut cached = self.config.write().await;
        let saved = self.config_store.update(update).await?;
        *cached = saved.clone();
        drop(cached);
        info!("Shop config updated: {:?}", saved);
        Ok(saved)
    }

    pub async fn volatility(&self, config: &ShopConfig) -> VolatilitySnapshot {
        volatility_state(&self.history, &config.volatility_thresholds).await
    }

    /// Fetch a spot price and price every karat tier against it.
    pub async fn rate_sheet(&self) -> RateSheet {
        let config = self.config().await;
        let spot = fetch_spot_price(self.price_source.as_ref(), &self.history).await;
        let volatility = self.volatility(&config).await;
        let table = calculate_rates(spot.price, &volatility, &config.volatility_margins);
        RateSheet {
            spot,
            table,
            config,
            computed_at: Local::now(),
        }
    }
}
