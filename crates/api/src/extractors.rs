//! Request extractors.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use engine_core::Event;
use serde_json::error::Category;
use telemetry::metrics;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::response::ApiError;

/// An [`Event`] parsed from a JSON body and checked against its field rules.
///
/// Unparseable JSON is a 400. Missing or mistyped fields and rule
/// violations are a 422 listing every offending field.
#[derive(Debug, Clone)]
pub struct ValidatedEvent(pub Event);

#[async_trait]
impl<S> FromRequest<S> for ValidatedEvent
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;

        metrics().events_received.inc();

        let event = parse_event(&body).map_err(|e| {
            metrics().events_rejected_validation.inc();
            debug!(payload_size = body.len(), status = e.status.as_u16(), "Event rejected");
            e
        })?;

        Ok(ValidatedEvent(event))
    }
}

/// Parses and validates one event body.
pub fn parse_event(body: &[u8]) -> Result<Event, ApiError> {
    let event: Event = serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => ApiError::validation(vec![e.to_string()]),
        _ => ApiError::bad_request(format!("Malformed JSON body: {}", e)),
    })?;

    event
        .validate()
        .map_err(|errors| ApiError::validation(field_messages(&errors)))?;

    Ok(event)
}

fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |err| format!("{}: failed {} rule", field, err.code))
        })
        .collect();
    messages.sort();
    messages
}
