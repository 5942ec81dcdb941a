// src/handlers/pages.rs
use log::{error, info};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use super::error::ApiError;
use crate::state::AppState;
use crate::views;

/// Rate sheet. Always renders; a failed price fetch shows the fallback banner.
pub async fn index(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    info!("Rendering rate sheet");
    let sheet = state.rate_sheet().await;
    Ok(warp::reply::html(views::rate_sheet_page(&sheet)))
}

pub async fn admin_panel(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    info!("Rendering admin panel");
    let config = state.config().await;
    let volatility = state.volatility(&config).await;
    Ok(warp::reply::html(views::admin_page(&config, &volatility)))
}

/// Recovery for the HTML routes: routing misses pass through untouched,
/// anything else becomes the error page with its detail.
///
/// Both page handlers are infallible today, so this only fires if a
/// fallible filter is later added in front of them. It keeps browsers on
/// an HTML page instead of the JSON error body.
pub async fn render_page_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if err.is_not_found() || err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Err(err);
    }

    let (status, detail) = match err.find::<ApiError>() {
        Some(api_error) => (api_error.status, api_error.message.clone()),
        None => (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err)),
    };
    error!("Internal server error on page: {}", detail);
    Ok(warp::reply::with_status(warp::reply::html(views::error_page(&detail)), status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn internal_rejection_renders_error_page_with_detail() {
        let reply = render_page_rejection(warp::reject::custom(ApiError::internal("history unreadable")))
            .await
            .ok()
            .unwrap();
        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = warp::hyper::body::to_bytes(response.into_body()).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("history unreadable"));
    }

    #[tokio::test]
    async fn routing_misses_pass_through() {
        assert!(render_page_rejection(warp::reject::not_found()).await.is_err());
    }
}
