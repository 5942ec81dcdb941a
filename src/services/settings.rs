// src/services/settings.rs
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{PawnError, Result};
use crate::models::VolatilityState;
use super::storage::{read_json, write_json_atomic};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginTable {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for MarginTable {
    fn default() -> Self {
        MarginTable {
            low: 4.0,
            medium: 6.0,
            high: 8.0,
        }
    }
}

impl MarginTable {
    pub fn margin_for(&self, state: VolatilityState) -> f64 {
        match state {
            VolatilityState::Low => self.low,
            VolatilityState::Medium => self.medium,
            VolatilityState::High => self.high,
        }
    }

    /// Lookup by state name; unknown names get the medium margin.
    pub fn margin_for_key(&self, key: &str) -> f64 {
        key.parse::<VolatilityState>()
            .map(|state| self.margin_for(state))
            .unwrap_or(self.medium)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityThresholds {
    pub low_limit: f64,
    pub high_limit: f64,
}

impl Default for VolatilityThresholds {
    fn default() -> Self {
        VolatilityThresholds {
            low_limit: 1.0,
            high_limit: 3.0,
        }
    }
}

/// Shop-wide settings edited from the admin panel. Keys this version does not
/// know about are carried in `extra` so a re-save does not drop them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub interest_rate: f64,
    pub shop_name: String,
    pub volatility_margins: MarginTable,
    pub volatility_thresholds: VolatilityThresholds,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            interest_rate: 0.13,
            shop_name: "Gold Pawnshop".to_string(),
            volatility_margins: MarginTable::default(),
            volatility_thresholds: VolatilityThresholds::default(),
            extra: Map::new(),
        }
    }
}

/// Partial update submitted from the admin form. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub interest_percent: Option<f64>,
    pub shop_name: Option<String>,
    pub margin_low: Option<f64>,
    pub margin_medium: Option<f64>,
    pub margin_high: Option<f64>,
    pub threshold_low: Option<f64>,
    pub threshold_high: Option<f64>,
}

impl ShopConfig {
    pub fn interest_percent(&self) -> f64 {
        self.interest_rate * 100.0
    }

    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(percent) = update.interest_percent {
            self.interest_rate = percent / 100.0;
        }
        if let Some(name) = &update.shop_name {
            self.shop_name = name.clone();
        }
        let margins = &mut self.volatility_margins;
        margins.low = update.margin_low.unwrap_or(margins.low);
        margins.medium = update.margin_medium.unwrap_or(margins.medium);
        margins.high = update.margin_high.unwrap_or(margins.high);

        let thresholds = &mut self.volatility_thresholds;
        thresholds.low_limit = update.threshold_low.unwrap_or(thresholds.low_limit);
        thresholds.high_limit = update.threshold_high.unwrap_or(thresholds.high_limit);
    }
}

pub struct ConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored config, falling back to defaults when the file is
    /// absent or unreadable.
    pub async fn load(&self) -> ShopConfig {
        match read_json::<ShopConfig>(&self.path).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                info!("No config at {}, using defaults", self.path.display());
                ShopConfig::default()
            }
            Err(e) => {
                warn!("Failed to load config: {:#}, using defaults", e);
                ShopConfig::default()
            }
        }
    }

    /// Read-modify-write under the store lock. Returns the config as persisted.
    pub async fn update(&self, update: &ConfigUpdate) -> Result<ShopConfig> {
        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await;
        config.apply(update);
        self.write(&config).await?;
        Ok(config)
    }

    async fn write(&self, config: &ShopConfig) -> Result<()> {
        write_json_atomic(&self.path, config).await.map_err(|e| {
            error!("Failed to save config: {:#}", e);
            PawnError::from(e)
        })
    }
}
