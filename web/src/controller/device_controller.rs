//! Controller for device shutoff messages.
//!
//! Adapts the inbound message channel to HTTP: a message is the raw JSON body.

use crate::AppState;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use domain::device_shutoff::DispatchOutcome;
use log::*;

/// POST /devices/turn-off
///
/// Turns off the device named in a `{"device": "<name>", "sender": "<optional>"}`
/// message. The message is always accepted: missing or unknown devices are
/// logged and dropped, never reported back to the sender.
#[utoipa::path(
    post,
    path = "/devices/turn-off",
    request_body(content = String, description = "JSON message naming the device", content_type = "application/json"),
    responses(
        (status = 202, description = "Message accepted and processed", body = String),
    )
)]
pub async fn turn_off(State(app_state): State<AppState>, body: String) -> impl IntoResponse {
    let outcome = app_state.device_dispatcher.handle_message(&body).await;
    if !matches!(outcome, DispatchOutcome::Dispatched { .. }) {
        debug!("Turn off device message dropped: {:?}", outcome);
    }

    (StatusCode::ACCEPTED, "accepted")
}
