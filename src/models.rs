// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PawnError;

/// Supported gold alloys. Ordered by increasing purity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Karat {
    K9,
    K14,
    K18,
    K22,
    K24,
}

impl Karat {
    pub const ALL: [Karat; 5] = [Karat::K9, Karat::K14, Karat::K18, Karat::K22, Karat::K24];

    pub fn value(self) -> u32 {
        match self {
            Karat::K9 => 9,
            Karat::K14 => 14,
            Karat::K18 => 18,
            Karat::K22 => 22,
            Karat::K24 => 24,
        }
    }

    /// Fraction of fine gold in the alloy.
    pub fn purity(self) -> f64 {
        match self {
            Karat::K9 => 0.375,
            Karat::K14 => 0.585,
            Karat::K18 => 0.75,
            Karat::K22 => 0.9167,
            Karat::K24 => 1.0,
        }
    }

    pub fn supported_list() -> String {
        Karat::ALL
            .iter()
            .map(|k| k.value().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<u32> for Karat {
    type Error = PawnError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Karat::ALL
            .into_iter()
            .find(|k| k.value() == value)
            .ok_or(PawnError::InvalidKarat(value))
    }
}

impl From<Karat> for u32 {
    fn from(karat: Karat) -> u32 {
        karat.value()
    }
}

impl fmt::Display for Karat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}k", self.value())
    }
}

/// One observed spot price. `date` is a human-readable copy of the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    #[serde(with = "epoch_seconds")]
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        PriceSample {
            timestamp,
            price,
            date: Some(timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Fractional unix seconds, as written by earlier versions of the history file.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(ts.timestamp_millis() as f64 / 1000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() {
            return Err(de::Error::custom("timestamp is not finite"));
        }
        DateTime::<Utc>::from_timestamp_millis((secs * 1000.0).round() as i64)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", secs)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityState {
    Low,
    Medium,
    High,
}

impl VolatilityState {
    pub fn as_str(self) -> &'static str {
        match self {
            VolatilityState::Low => "low",
            VolatilityState::Medium => "medium",
            VolatilityState::High => "high",
        }
    }
}

impl FromStr for VolatilityState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(VolatilityState::Low),
            "medium" => Ok(VolatilityState::Medium),
            "high" => Ok(VolatilityState::High),
            other => Err(format!("unknown volatility state '{}'", other)),
        }
    }
}

impl fmt::Display for VolatilityState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VolatilityDetails {
    InsufficientData { count: usize },
    Range { min: f64, max: f64, avg: f64, count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilitySnapshot {
    pub state: VolatilityState,
    pub volatility_percent: f64,
    pub details: VolatilityDetails,
}

impl VolatilitySnapshot {
    pub fn insufficient(count: usize) -> Self {
        VolatilitySnapshot {
            state: VolatilityState::Medium,
            volatility_percent: 0.0,
            details: VolatilityDetails::InsufficientData { count },
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.details, VolatilityDetails::InsufficientData { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateEntry {
    pub karat: Karat,
    pub melt_value_per_gram: f64,
    pub buy_pawn_price_per_gram: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateMeta {
    pub state: VolatilityState,
    pub volatility_percent: f64,
    pub active_margin: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateTable {
    pub rates: BTreeMap<Karat, RateEntry>,
    pub meta: RateMeta,
}

impl RateTable {
    pub fn get(&self, karat: Karat) -> Option<&RateEntry> {
        self.rates.get(&karat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanQuote {
    pub karat: Karat,
    pub weight: f64,
    pub melt_value_per_gram: f64,
    pub total_melt_value: f64,
    pub buy_pawn_price_per_gram: f64,
    pub loan_amount: f64,
    pub interest_amount: f64,
    pub total_due: f64,
    pub due_date: NaiveDate,
}

/// A spot price per troy ounce and whether it is the static stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpotPrice {
    pub price: f64,
    pub is_fallback: bool,
}
