// src/handlers/loan.rs
use log::{info, warn};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::{required_field, Form};
use crate::error::PawnError;
use crate::services::loan;
use crate::state::AppState;

pub async fn calculate(form: Form, state: Arc<AppState>) -> Result<Json, Rejection> {
    let reject = |e: PawnError| {
        warn!("Rejecting loan calculation: {}", e);
        warp::reject::custom(ApiError::from(e))
    };

    let karat: u32 = required_field(&form, "karat").map_err(reject)?;
    let weight: f64 = required_field(&form, "weight").map_err(reject)?;
    // validate before fetching a price
    loan::validate(karat, weight).map_err(reject)?;

    let sheet = state.rate_sheet().await;
    let quote = loan::quote(karat, weight, &sheet.table, sheet.config.interest_rate).map_err(reject)?;
    info!(
        "Quoted {}g of {}k: loan {:.2}, due {} on {}",
        weight, karat, quote.loan_amount, quote.total_due, quote.due_date
    );
    Ok(warp::reply::json(&quote))
}
