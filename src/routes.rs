// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;
use log::{info, warn};
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{admin, loan, pages, rates, Form};
use crate::state::AppState;

const FORM_LIMIT_BYTES: u64 = 16 * 1024;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid form body: {}", e);
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = StatusCode::UNSUPPORTED_MEDIA_TYPE;
        message = "Expected a form-encoded body".to_string();
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        code = StatusCode::LENGTH_REQUIRED;
        message = "A content-length header is required".to_string();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload too large".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        warn!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

fn form_body() -> impl Filter<Extract = (Form,), Error = Rejection> + Clone {
    warp::body::content_length_limit(FORM_LIMIT_BYTES).and(warp::body::form::<Form>())
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let index_route = warp::path::end()
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(pages::index)
        .recover(pages::render_page_rejection);

    let admin_route = warp::path!("admin")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(pages::admin_panel)
        .recover(pages::render_page_rejection);

    let calculate_route = warp::path!("calculate")
        .and(warp::post())
        .and(form_body())
        .and(state_filter.clone())
        .and_then(loan::calculate);

    let rates_route = warp::path!("api" / "rates")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(rates::get_rates);

    let health_route = warp::path!("health")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(rates::health);

    let admin_update_route = warp::path!("admin" / "update")
        .and(warp::post())
        .and(form_body())
        .and(state_filter.clone())
        .and_then(admin::update_config);

    info!("All routes configured successfully.");

    index_route
        .or(admin_route)
        .or(calculate_route)
        .or(rates_route)
        .or(health_route)
        .or(admin_update_route)
        .recover(handle_rejection)
}
