//! HTTP API
//!
//! Thin axum adapter over [`ContentService`]. Every response is JSON with a
//! `status` of `"success"` or `"error"`; failures map to HTTP 500.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::content::{ContentError, ContentKind, Item};
use crate::service::ContentService;

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        let body = Json(json!({
            "error": self.to_string(),
            "status": "error",
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Body of `GET /api/daily-content`
#[derive(Debug, Serialize)]
pub struct DailyContentResponse {
    /// Today's quote
    pub quote: Item,
    /// Today's good deed
    #[serde(rename = "goodDeed")]
    pub good_deed: Item,
    /// Time the response was built (RFC 3339)
    pub date: DateTime<Utc>,
    /// Always `"success"`
    pub status: &'static str,
}

/// Body of `GET /api/random-quote`
#[derive(Debug, Serialize)]
pub struct RandomQuoteResponse {
    pub quote: Item,
    pub status: &'static str,
}

/// Body of `GET /api/random-deed`
#[derive(Debug, Serialize)]
pub struct RandomDeedResponse {
    #[serde(rename = "goodDeed")]
    pub good_deed: Item,
    pub status: &'static str,
}

/// Body of `GET /api/update-content`
#[derive(Debug, Serialize)]
pub struct UpdateContentResponse {
    pub message: &'static str,
    /// Cache timestamp after the refresh
    pub last_updated: Option<DateTime<Utc>>,
    pub status: &'static str,
}

const SUCCESS: &str = "success";

/// Builds the API router
///
/// Routes are all `GET`, and every response carries
/// `Access-Control-Allow-Origin: *`.
pub fn router(service: Arc<ContentService>) -> Router {
    Router::new()
        .route("/api/daily-content", get(daily_content))
        .route("/api/random-quote", get(random_quote))
        .route("/api/random-deed", get(random_deed))
        .route("/api/update-content", get(update_content))
        .layer(middleware::map_response(allow_any_origin))
        .with_state(service)
}

/// Serves the API on `addr` until `shutdown` resolves
///
/// # Arguments
/// * `addr` - Address to bind; port 0 picks a free port
/// * `service` - Service shared by every handler
/// * `shutdown` - Future that starts graceful shutdown when it completes
pub async fn serve(
    addr: SocketAddr,
    service: Arc<ContentService>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "API listening");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

async fn daily_content(
    State(service): State<Arc<ContentService>>,
) -> Result<Json<DailyContentResponse>, ApiError> {
    let now = Utc::now();
    let today = now.date_naive();
    let quote = service.get_daily_on(ContentKind::Quotes, today).await?;
    let good_deed = service.get_daily_on(ContentKind::GoodDeeds, today).await?;

    Ok(Json(DailyContentResponse {
        quote,
        good_deed,
        date: now,
        status: SUCCESS,
    }))
}

async fn random_quote(
    State(service): State<Arc<ContentService>>,
) -> Result<Json<RandomQuoteResponse>, ApiError> {
    let quote = service.get_random(ContentKind::Quotes).await?;
    Ok(Json(RandomQuoteResponse {
        quote,
        status: SUCCESS,
    }))
}

async fn random_deed(
    State(service): State<Arc<ContentService>>,
) -> Result<Json<RandomDeedResponse>, ApiError> {
    let good_deed = service.get_random(ContentKind::GoodDeeds).await?;
    Ok(Json(RandomDeedResponse {
        good_deed,
        status: SUCCESS,
    }))
}

async fn update_content(
    State(service): State<Arc<ContentService>>,
) -> Result<Json<UpdateContentResponse>, ApiError> {
    let report = service.refresh().await?;
    Ok(Json(UpdateContentResponse {
        message: "Content updated successfully",
        last_updated: report.last_updated,
        status: SUCCESS,
    }))
}
