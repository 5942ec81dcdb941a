// src/handlers/admin.rs
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::{form_field, Form};
use crate::error::PawnError;
use crate::services::settings::ConfigUpdate;
use crate::state::AppState;

pub fn parse_update(form: &Form) -> Result<ConfigUpdate, PawnError> {
    Ok(ConfigUpdate {
        interest_percent: form_field(form, "interest_percent")?,
        shop_name: form
            .get("shop_name")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        margin_low: form_field(form, "margin_low")?,
        margin_medium: form_field(form, "margin_medium")?,
        margin_high: form_field(form, "margin_high")?,
        threshold_low: form_field(form, "threshold_low")?,
        threshold_high: form_field(form, "threshold_high")?,
    })
}

pub async fn update_config(form: Form, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling admin config update");

    let update = parse_update(&form).map_err(|e| warp::reject::custom(ApiError::from(e)))?;
    if let Some(bad) = [
        update.interest_percent,
        update.margin_low,
        update.margin_medium,
        update.margin_high,
        update.threshold_low,
        update.threshold_high,
    ]
    .into_iter()
    .flatten()
    .find(|v| !v.is_finite())
    {
        return Err(warp::reject::custom(ApiError::bad_request(format!(
            "Invalid input {}. Please enter valid numbers.",
            bad
        ))));
    }

    match state.update_config(&update).await {
        Ok(_) => Ok(warp::reply::json(&json!({
            "success": true,
            "message": "Dynamic Pricing Strategy updated!",
        }))),
        Err(e) => {
            error!("Error updating config: {}", e);
            Err(warp::reject::custom(ApiError::internal("Failed to save configuration")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_admin_form() {
        let form: Form = [
            ("interest_percent", "13"),
            ("shop_name", " Corner Gold "),
            ("margin_low", "4"),
            ("margin_medium", "6"),
            ("margin_high", "8"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let update = parse_update(&form).unwrap();
        assert_eq!(update.interest_percent, Some(13.0));
        assert_eq!(update.shop_name.as_deref(), Some("Corner Gold"));
        assert_eq!(update.margin_high, Some(8.0));
        assert_eq!(update.threshold_low, None);
    }

    #[test]
    fn non_numeric_margin_is_rejected() {
        let form: Form = [("margin_low".to_string(), "four".to_string())].into_iter().collect();
        assert_eq!(
            parse_update(&form),
            Err(PawnError::InvalidNumericInput("margin_low".into()))
        );
    }
}
