// src/handlers/rates.rs
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::reply::Json;

use crate::models::{RateEntry, RateMeta};
use crate::state::AppState;

#[derive(Serialize)]
struct RatesResponse<'a> {
    price: f64,
    is_fallback: bool,
    rates: BTreeMap<u32, &'a RateEntry>,
    meta: &'a RateMeta,
    last_updated: String,
}

pub async fn get_rates(state: Arc<AppState>) -> Result<Json, Infallible> {
    info!("Handling request to get current rates");
    let sheet = state.rate_sheet().await;

    let response = RatesResponse {
        price: sheet.spot.price,
        is_fallback: sheet.spot.is_fallback,
        rates: sheet.table.rates.iter().map(|(k, v)| (k.value(), v)).collect(),
        meta: &sheet.table.meta,
        last_updated: sheet.computed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    Ok(warp::reply::json(&response))
}

pub async fn health(state: Arc<AppState>) -> Result<Json, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "ok",
        "message": "Gold Pawnshop Calculator is running",
        "debug": state.debug,
    })))
}
