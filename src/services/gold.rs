// src/services/gold.rs
use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{PawnError, Result};
use crate::models::SpotPrice;
use super::history::PriceHistoryStore;

/// Stand-in spot price per troy ounce when no live quote is available.
pub const FALLBACK_GOLD_PRICE: f64 = 3900.0;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Spot price of fine gold per troy ounce in the shop currency.
    async fn spot_price(&self) -> Result<f64>;
}

/// Gold futures (USD) converted to EUR through the Yahoo chart API.
pub struct YahooGoldSource {
    client: Client,
    base_url: String,
}

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const GOLD_SYMBOL: &str = "GC=F";
const USD_EUR_SYMBOL: &str = "EUR=X";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooGoldSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| PawnError::PriceSourceUnavailable(e.to_string()))?;
        Ok(YahooGoldSource {
            client,
            base_url: base_url.into(),
        })
    }

    async fn last_close(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), symbol);
        info!("Fetching chart data from URL: {}", url);

        let response: ChartResponse = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PawnError::PriceSourceUnavailable(format!("{}: {}", symbol, e)))?
            .json()
            .await
            .map_err(|e| PawnError::PriceSourceUnavailable(format!("{}: {}", symbol, e)))?;

        last_close_from(response)
            .ok_or_else(|| PawnError::PriceSourceUnavailable(format!("{} returned empty data", symbol)))
    }
}

fn last_close_from(response: ChartResponse) -> Option<f64> {
    let result = response.chart.result?.into_iter().next()?;
    let from_series = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .and_then(|q| q.close.into_iter().flatten().last());
    from_series.or_else(|| result.meta.and_then(|m| m.regular_market_price))
}

#[async_trait]
impl PriceSource for YahooGoldSource {
    async fn spot_price(&self) -> Result<f64> {
        let gold_usd = self.last_close(GOLD_SYMBOL).await?;
        let eur_rate = self.last_close(USD_EUR_SYMBOL).await?;
        let price = gold_usd * eur_rate;
        info!(
            "Yahoo live: gold ${:.2} | rate {:.4} | price {:.2} EUR",
            gold_usd, eur_rate, price
        );
        Ok(price)
    }
}

/// Fetch a live price and record it in the history. Any source failure, or a
/// non-positive quote, yields the fallback price flagged as such and leaves
/// the history untouched.
pub async fn fetch_spot_price(source: &dyn PriceSource, history: &PriceHistoryStore) -> SpotPrice {
    let fetched = source.spot_price().await.and_then(|price| {
        if price.is_finite() && price > 0.0 {
            Ok(price)
        } else {
            Err(PawnError::PriceSourceUnavailable(format!("unusable price {}", price)))
        }
    });

    match fetched {
        Ok(price) => {
            history.record(price).await;
            SpotPrice { price, is_fallback: false }
        }
        Err(e) => {
            warn!("{}; using static fallback gold price {:.2}", e, FALLBACK_GOLD_PRICE);
            SpotPrice { price: FALLBACK_GOLD_PRICE, is_fallback: true }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<f64>);

    #[async_trait]
    impl PriceSource for Fixed {
        async fn spot_price(&self) -> Result<f64> {
            self.0.clone()
        }
    }

    #[test]
    fn last_close_skips_null_points() {
        let body = r#"{"chart": {"result": [{
            "meta": {"regularMarketPrice": 2650.0},
            "indicators": {"quote": [{"close": [2601.5, 2610.25, null]}]}
        }], "error": null}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(last_close_from(response), Some(2610.25));
    }

    #[test]
    fn last_close_falls_back_to_market_price() {
        let body = r#"{"chart": {"result": [{
            "meta": {"regularMarketPrice": 0.9215},
            "indicators": {"quote": [{"close": []}]}
        }]}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(last_close_from(response), Some(0.9215));
    }

    #[test]
    fn empty_result_has_no_close() {
        let response: ChartResponse =
            serde_json::from_str(r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#).unwrap();
        assert_eq!(last_close_from(response), None);
    }

    #[tokio::test]
    async fn live_price_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let history = PriceHistoryStore::new(dir.path().join("price_history.json"));

        let spot = fetch_spot_price(&Fixed(Ok(3900.0)), &history).await;
        // a genuine quote equal to the fallback constant is still live
        assert_eq!(spot, SpotPrice { price: 3900.0, is_fallback: false });
        assert_eq!(history.recent().await.len(), 1);
    }

    #[tokio::test]
    async fn failure_uses_fallback_without_recording() {
        let dir = tempfile::tempdir().unwrap();
        let history = PriceHistoryStore::new(dir.path().join("price_history.json"));

        let down = Fixed(Err(PawnError::PriceSourceUnavailable("timeout".into())));
        let spot = fetch_spot_price(&down, &history).await;
        assert_eq!(spot, SpotPrice { price: FALLBACK_GOLD_PRICE, is_fallback: true });

        let spot = fetch_spot_price(&Fixed(Ok(f64::NAN)), &history).await;
        assert!(spot.is_fallback);
        assert!(history.recent().await.is_empty());
    }
}
