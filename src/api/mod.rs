//! HTTP API.
//!
//! ## Routes
//!
//! ```text
//! POST /dispense      {motor, steps}                         immediate dispense
//! POST /set_alarm     {motor, alarm_time, count, drug_name}  schedule an alarm
//! GET  /get_alarms                                           full alarm table
//! POST /search        {drug_name}                            drug table lookup
//! POST /play_melody                                          speaker alert
//! GET  /message                                              latest status string
//! GET  /healthz                                              liveness probe
//! ```
//!
//! ## Rules
//!
//! - Bodies and responses are JSON. Success envelopes carry
//!   `"status": "success"`; failures carry `{"error": <message>}`.
//! - Validation failures map to 400, everything else to 500. The mapping
//!   lives in one place, the [`IntoResponse`] impl below; handlers just
//!   return [`Result`](crate::error::Result).

mod routes;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::warn;

use crate::error::Error;
use crate::gateway::Gateway;
use crate::notify::StatusFeed;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub feed: StatusFeed,
}

/// Builds the full route table over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/dispense", post(routes::dispense))
        .route("/set_alarm", post(routes::set_alarm))
        .route("/get_alarms", get(routes::get_alarms))
        .route("/search", post(routes::search))
        .route("/play_melody", post(routes::play_melody))
        .route("/message", get(routes::message))
        .route("/healthz", get(routes::healthz))
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        warn!(label = self.as_label(), error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
