//! Route handlers.
//!
//! Handlers stay thin: decode the body, call one gateway operation, wrap the
//! result in the success envelope. All policy lives in the gateway.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};

use super::AppState;

/// Accepts a field sent either as a JSON number or as a string; display
/// clients are loose about which one they send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s,
        }
    }

    fn into_count(self, field: &'static str) -> Result<u32> {
        match self {
            NumberOrText::Number(n) => u32::try_from(n)
                .map_err(|_| Error::InvalidInput(format!("{field} {n} is out of range"))),
            NumberOrText::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::InvalidInput(format!("{field} {s:?} is not an integer"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DispenseBody {
    motor: String,
    steps: NumberOrText,
}

#[derive(Debug, Deserialize)]
pub(super) struct SetAlarmBody {
    motor: String,
    alarm_time: String,
    count: NumberOrText,
    #[serde(default)]
    drug_name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchBody {
    drug_name: String,
}

pub(super) async fn dispense(
    State(state): State<AppState>,
    Json(body): Json<DispenseBody>,
) -> Result<Json<Value>> {
    let receipt = state
        .gateway
        .dispense_now(&body.motor, &body.steps.into_text())
        .await?;
    Ok(Json(json!({
        "status": "success",
        "command_sent": receipt.command_sent,
    })))
}

pub(super) async fn set_alarm(
    State(state): State<AppState>,
    Json(body): Json<SetAlarmBody>,
) -> Result<Json<Value>> {
    let count = body.count.into_count("count")?;
    let record = state
        .gateway
        .set_alarm(&body.motor, &body.alarm_time, count, &body.drug_name)
        .await?;
    let alarm_time = record
        .time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();
    Ok(Json(json!({
        "status": "success",
        "motor": body.motor,
        "alarm_time": alarm_time,
        "count": record.count,
        "drug_name": record.drug_name,
    })))
}

pub(super) async fn get_alarms(State(state): State<AppState>) -> Json<Value> {
    let alarms = state.gateway.list_alarms();
    Json(json!({
        "status": "success",
        "alarms": alarms,
    }))
}

pub(super) async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Response> {
    let matches = state.gateway.search(&body.drug_name).await?;
    if matches.is_empty() {
        let message = format!("no drug found matching {:?}", body.drug_name.trim());
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response());
    }
    Ok(Json(json!({
        "status": "success",
        "results": matches,
    }))
    .into_response())
}

pub(super) async fn play_melody(State(state): State<AppState>) -> Result<Json<Value>> {
    state.gateway.play_melody()?;
    Ok(Json(json!({
        "status": "success",
        "message": "melody playing",
    })))
}

pub(super) async fn message(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": state.feed.latest(),
    }))
}

pub(super) async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
