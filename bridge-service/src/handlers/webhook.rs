//! Up webhook receiver.
//!
//! Up retries any delivery that is not answered with a 2xx, and a retry of a
//! created event would record the transaction twice. Every delivery is
//! therefore acknowledged with `200 OK`; failures are logged and counted.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use service_core::observability::extract_request_id;

use crate::models::up::WebhookEvent;
use crate::services::{record_best_effort_failure, record_event, ProcessError};
use crate::startup::AppState;

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let request_id = extract_request_id(&headers).unwrap_or_default();

    let event = match serde_json::from_slice::<WebhookEvent>(&body) {
        Ok(event) => event.data,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Unparseable webhook body");
            record_event("unparseable", "rejected");
            return StatusCode::OK;
        }
    };

    let event_type = event.attributes.event_type;
    tracing::info!(request_id = %request_id, event_type = %event_type, "Received webhook event");

    match state.processor.handle(&event).await {
        Ok(outcome) => {
            tracing::debug!(
                request_id = %request_id,
                event_type = %event_type,
                outcome = outcome.as_str(),
                "Webhook event processed"
            );
            record_event(event_type.as_str(), outcome.as_str());
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                event_type = %event_type,
                error = %e,
                "Failed to process webhook event"
            );
            record_event(event_type.as_str(), "failed");
            record_best_effort_failure(failure_operation(&e));
        }
    }

    StatusCode::OK
}

fn failure_operation(err: &ProcessError) -> &'static str {
    match err {
        ProcessError::MissingTransaction => "event_without_transaction",
        ProcessError::Bank(_) => "transaction_fetch",
        ProcessError::Ledger(_) => "ledger_write",
        ProcessError::Translation(_) => "transaction_translate",
    }
}
