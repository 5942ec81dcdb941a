//! Shared fixtures for the HTTP integration tests: an in-process price source
//! and an `AppState` rooted in a temporary data directory.

use async_trait::async_trait;
use gold_pawnshop::error::{PawnError, Result};
use gold_pawnshop::services::gold::PriceSource;
use gold_pawnshop::services::history::PriceHistoryStore;
use gold_pawnshop::services::settings::ConfigStore;
use gold_pawnshop::state::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns a fixed price, or fails when constructed with `None`.
pub struct FixedSource {
    price: Option<f64>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(price: Option<f64>) -> Arc<Self> {
        Arc::new(FixedSource {
            price,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FixedSource {
    async fn spot_price(&self) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.price
            .ok_or_else(|| PawnError::PriceSourceUnavailable("source offline".into()))
    }
}

/// Keep the `TempDir` alive for the duration of the test.
pub async fn setup_state(source: Arc<FixedSource>) -> (Arc<AppState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(
        ConfigStore::new(dir.path().join("config.json")),
        PriceHistoryStore::new(dir.path().join("price_history.json")),
        source,
        false,
    )
    .await;
    (Arc::new(state), dir)
}

pub const FORM: &str = "application/x-www-form-urlencoded";
