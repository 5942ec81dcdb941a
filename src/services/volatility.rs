// src/services/volatility.rs
use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::models::{PriceSample, VolatilityDetails, VolatilitySnapshot, VolatilityState};
use super::history::{retention_window, PriceHistoryStore};
use super::settings::VolatilityThresholds;

/// Classify recent price dispersion from the history store. Storage problems
/// read as "no data" and produce the neutral medium snapshot.
pub async fn volatility_state(
    history: &PriceHistoryStore,
    thresholds: &VolatilityThresholds,
) -> VolatilitySnapshot {
    volatility_state_at(history, thresholds, Utc::now()).await
}

pub async fn volatility_state_at(
    history: &PriceHistoryStore,
    thresholds: &VolatilityThresholds,
    now: DateTime<Utc>,
) -> VolatilitySnapshot {
    match history.try_recent(retention_window(), now).await {
        Ok(samples) => assess(&samples, thresholds),
        Err(e) => {
            warn!("Error calculating volatility, assuming medium: {}", e);
            VolatilitySnapshot::insufficient(0)
        }
    }
}

/// Range-over-mean dispersion, `(max - min) / mean * 100`, bucketed by
/// exclusive thresholds.
pub fn assess(samples: &[PriceSample], thresholds: &VolatilityThresholds) -> VolatilitySnapshot {
    if samples.len() < 2 {
        return VolatilitySnapshot::insufficient(samples.len());
    }

    let (min, max, sum) = samples.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), s| (min.min(s.price), max.max(s.price), sum + s.price),
    );
    let count = samples.len();
    let avg = sum / count as f64;
    if !(avg.is_finite() && avg > 0.0) {
        warn!("Price history average {} is unusable, assuming medium", avg);
        return VolatilitySnapshot::insufficient(count);
    }

    let volatility_percent = (max - min) / avg * 100.0;
    let state = classify(volatility_percent, thresholds);
    debug!(
        "Volatility {:.3}% over {} samples (min {:.2}, max {:.2}) -> {}",
        volatility_percent, count, min, max, state
    );

    VolatilitySnapshot {
        state,
        volatility_percent,
        details: VolatilityDetails::Range { min, max, avg, count },
    }
}

pub fn classify(volatility_percent: f64, thresholds: &VolatilityThresholds) -> VolatilityState {
    if volatility_percent < thresholds.low_limit {
        VolatilityState::Low
    } else if volatility_percent > thresholds.high_limit {
        VolatilityState::High
    } else {
        VolatilityState::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn samples(prices: &[f64]) -> Vec<PriceSample> {
        let now = Utc::now();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PriceSample::new(now - Duration::minutes((prices.len() - i) as i64), *p))
            .collect()
    }

    #[test]
    fn fewer_than_two_samples_is_medium() {
        let thresholds = VolatilityThresholds::default();
        for prices in [&[][..], &[3900.0][..]] {
            let snapshot = assess(&samples(prices), &thresholds);
            assert_eq!(snapshot.state, VolatilityState::Medium);
            assert_eq!(snapshot.volatility_percent, 0.0);
            assert!(snapshot.is_insufficient());
        }
    }

    #[test]
    fn range_over_mean() {
        let snapshot = assess(&samples(&[100.0, 102.0, 104.0]), &VolatilityThresholds::default());
        // (104 - 100) / 102 * 100
        assert!((snapshot.volatility_percent - 3.921_568_627).abs() < 1e-6);
        assert_eq!(snapshot.state, VolatilityState::High);
        assert_eq!(
            snapshot.details,
            VolatilityDetails::Range { min: 100.0, max: 104.0, avg: 102.0, count: 3 }
        );
    }

    #[test]
    fn calm_market_is_low() {
        let snapshot = assess(&samples(&[3900.0, 3905.0, 3902.0]), &VolatilityThresholds::default());
        assert_eq!(snapshot.state, VolatilityState::Low);
    }

    #[test]
    fn thresholds_are_exclusive() {
        let thresholds = VolatilityThresholds { low_limit: 1.0, high_limit: 3.0 };
        assert_eq!(classify(1.0, &thresholds), VolatilityState::Medium);
        assert_eq!(classify(3.0, &thresholds), VolatilityState::Medium);
        assert_eq!(classify(0.999, &thresholds), VolatilityState::Low);
        assert_eq!(classify(3.001, &thresholds), VolatilityState::High);

        // (101 - 99) / 100 * 100 == 2.0 exactly
        let on_boundary = VolatilityThresholds { low_limit: 2.0, high_limit: 5.0 };
        let snapshot = assess(&samples(&[99.0, 101.0]), &on_boundary);
        assert_eq!(snapshot.volatility_percent, 2.0);
        assert_eq!(snapshot.state, VolatilityState::Medium);
    }

    #[tokio::test]
    async fn corrupt_history_is_medium_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceHistoryStore::new(dir.path().join("price_history.json"));
        std::fs::write(store.path(), "not json at all").unwrap();

        let snapshot = volatility_state(&store, &VolatilityThresholds::default()).await;
        assert_eq!(snapshot.state, VolatilityState::Medium);
        assert_eq!(snapshot.volatility_percent, 0.0);
        assert!(snapshot.is_insufficient());
    }

    #[tokio::test]
    async fn old_samples_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceHistoryStore::new(dir.path().join("price_history.json"));
        let now = Utc::now();
        let seeded = vec![
            PriceSample::new(now - Duration::days(30), 1000.0),
            PriceSample::new(now - Duration::hours(2), 3900.0),
        ];
        crate::services::storage::write_json_atomic(store.path(), &seeded).await.unwrap();

        let snapshot = volatility_state_at(&store, &VolatilityThresholds::default(), now).await;
        assert!(snapshot.is_insufficient());
    }
}
