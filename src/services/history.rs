// src/services/history.rs
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, warn};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{PawnError, Result};
use crate::models::PriceSample;
use super::storage::{read_json, write_json_atomic};

pub const RETENTION_DAYS: i64 = 14;
pub const MAX_SAMPLES: usize = 1000;

pub fn retention_window() -> Duration {
    Duration::days(RETENTION_DAYS)
}

/// Rolling log of observed spot prices backed by a JSON array on disk.
/// The file is the source of truth; nothing is cached between calls.
pub struct PriceHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PriceHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PriceHistoryStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a sample stamped with the current time.
    pub async fn record(&self, price: f64) -> Vec<PriceSample> {
        self.record_at(price, Utc::now()).await
    }

    /// Append a sample stamped `now`, apply retention and persist. Returns the
    /// retained samples; a failed write is logged and the samples are still
    /// returned.
    pub async fn record_at(&self, price: f64, now: DateTime<Utc>) -> Vec<PriceSample> {
        let _guard = self.write_lock.lock().await;

        let mut samples = match self.load().await {
            Ok(samples) => samples,
            Err(e) => {
                warn!("Failed to load price history, starting fresh: {}", e);
                Vec::new()
            }
        };
        samples.push(PriceSample::new(now, price));
        let samples = apply_retention(samples, now);

        if let Err(e) = write_json_atomic(&self.path, &samples).await {
            error!("Failed to save price history to {}: {:#}", self.path.display(), e);
        } else {
            debug!("Recorded price {:.2}, history holds {} samples", price, samples.len());
        }
        samples
    }

    /// Samples from the last fourteen days. Unreadable storage yields an
    /// empty list.
    pub async fn recent(&self) -> Vec<PriceSample> {
        match self.try_recent(retention_window(), Utc::now()).await {
            Ok(samples) => samples,
            Err(e) => {
                warn!("Treating price history as empty: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn try_recent(&self, window: Duration, now: DateTime<Utc>) -> Result<Vec<PriceSample>> {
        let cutoff = now - window;
        let samples = self.load().await?;
        Ok(samples.into_iter().filter(|s| s.timestamp >= cutoff).collect())
    }

    async fn load(&self) -> Result<Vec<PriceSample>> {
        let samples: Option<Vec<PriceSample>> = read_json(&self.path)
            .await
            .map_err(PawnError::from)?;
        Ok(samples.unwrap_or_default())
    }
}

/// Drop samples older than the retention window, then keep at most the
/// newest `MAX_SAMPLES`. Input order is preserved.
pub fn apply_retention(samples: Vec<PriceSample>, now: DateTime<Utc>) -> Vec<PriceSample> {
    let cutoff = now - retention_window();
    let mut kept: Vec<PriceSample> = samples.into_iter().filter(|s| s.timestamp >= cutoff).collect();
    if kept.len() > MAX_SAMPLES {
        kept.drain(..kept.len() - MAX_SAMPLES);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> PriceHistoryStore {
        PriceHistoryStore::new(dir.path().join("price_history.json"))
    }

    #[tokio::test]
    async fn record_drops_samples_older_than_fourteen_days() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();

        store.record_at(3800.0, now - Duration::days(20)).await;
        store.record_at(3810.0, now - Duration::days(13)).await;
        let kept = store.record_at(3820.0, now).await;

        let prices: Vec<f64> = kept.iter().map(|s| s.price).collect();
        assert_eq!(prices, vec![3810.0, 3820.0]);
        assert!(kept.iter().all(|s| now - s.timestamp <= retention_window()));
    }

    #[tokio::test]
    async fn record_caps_history_at_max_samples() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();

        let seeded: Vec<PriceSample> = (0..MAX_SAMPLES + 5)
            .map(|i| PriceSample::new(now - Duration::seconds((MAX_SAMPLES + 5 - i) as i64), i as f64))
            .collect();
        write_json_atomic(store.path(), &seeded).await.unwrap();

        let kept = store.record_at(9999.0, now).await;
        assert_eq!(kept.len(), MAX_SAMPLES);
        assert_eq!(kept.last().unwrap().price, 9999.0);
        // the six oldest are gone
        assert_eq!(kept.first().unwrap().price, 6.0);

        let on_disk = store.try_recent(retention_window(), now).await.unwrap();
        assert_eq!(on_disk.len(), MAX_SAMPLES);
    }

    #[tokio::test]
    async fn recent_is_empty_for_missing_or_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.recent().await.is_empty());

        std::fs::write(store.path(), "[{\"timestamp\": oops").unwrap();
        assert!(store.recent().await.is_empty());
        assert!(matches!(
            store.try_recent(retention_window(), Utc::now()).await,
            Err(PawnError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn record_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "garbage").unwrap();

        let kept = store.record(3900.5).await;
        assert_eq!(kept.len(), 1);
        assert_eq!(store.recent().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_write_is_swallowed_and_sample_returned() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        // a directory in place of the file makes both the read and the rename fail
        std::fs::create_dir(store.path()).unwrap();

        let kept = store.record(3800.0).await;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].price, 3800.0);
        assert!(store.recent().await.is_empty());
        assert!(store.path().is_dir());
    }

    #[tokio::test]
    async fn reads_float_timestamps_from_older_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();
        let ts = now.timestamp() as f64 - 60.5;
        std::fs::write(
            store.path(),
            format!(r#"[{{"timestamp": {}, "price": 3850.25, "date": "x"}}]"#, ts),
        )
        .unwrap();

        let recent = store.try_recent(retention_window(), now).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].price, 3850.25);
    }
}
