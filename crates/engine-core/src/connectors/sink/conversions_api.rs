use super::{DeliveryOutcome, DeliveryReport, EventSink};
use crate::{
    config::{BackfillConfig, Credentials},
    error::DeliveryError,
};
use async_trait::async_trait;
use model::{events::ConversionEvent, records::batch::Batch};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Longest response body excerpt kept in errors and logs.
const BODY_EXCERPT_LEN: usize = 512;

/// Posts batches to `{base}/{version}/{namespace}/events`.
pub struct ConversionsApiClient {
    client: reqwest::Client,
    url: String,
    credentials: Credentials,
    test_event_code: Option<String>,
    upload_tag: Option<String>,
}

#[derive(Serialize)]
struct EventsRequest<'a> {
    access_token: &'a str,
    data: &'a [ConversionEvent],
    #[serde(skip_serializing_if = "Option::is_none")]
    test_event_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upload_tag: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events_received: Option<u64>,
    #[serde(default)]
    messages: Vec<ApiMessage>,
    #[serde(default)]
    fbtrace_id: Option<String>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    fbtrace_id: Option<String>,
}

impl ConversionsApiClient {
    pub fn new(config: &BackfillConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.api.timeout)
            .build()
            .map_err(DeliveryError::Client)?;

        Ok(ConversionsApiClient {
            client,
            url: config.events_url(),
            credentials: config.credentials.clone(),
            test_event_code: config.test_event_code(),
            upload_tag: config.upload_tag().map(String::from),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request<'a>(&'a self, events: &'a [ConversionEvent]) -> EventsRequest<'a> {
        EventsRequest {
            access_token: self.credentials.access_token(),
            data: events,
            test_event_code: self.test_event_code.as_deref(),
            upload_tag: self.upload_tag.as_deref(),
        }
    }
}

#[async_trait]
impl EventSink for ConversionsApiClient {
    async fn send(&self, batch: &Batch) -> Result<DeliveryOutcome, DeliveryError> {
        let start = Instant::now();
        let body = self.request(&batch.events);

        debug!(
            batch = batch.seq,
            events = batch.len(),
            test_event_code = ?body.test_event_code,
            upload_tag = ?body.upload_tag,
            "Posting batch"
        );

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let outcome = interpret_response(status, &text)?;

        if let DeliveryOutcome::Accepted(report) | DeliveryOutcome::AcceptedWithWarnings(report) =
            &outcome
        {
            info!(
                batch = batch.seq,
                events = batch.len(),
                events_received = ?report.events_received,
                warnings = report.warnings.len(),
                trace_id = ?report.trace_id,
                duration_ms = start.elapsed().as_millis(),
                "Batch accepted"
            );
        }

        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "conversions-api"
    }
}

/// Classifies an API response.
///
/// An `error` object rejects the whole batch whatever the status code.
/// Warning messages are surfaced but do not fail the batch.
pub fn interpret_response(status: u16, body: &str) -> Result<DeliveryOutcome, DeliveryError> {
    let success = (200..300).contains(&status);

    let parsed: EventsResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !success => {
            return Err(DeliveryError::Status {
                status,
                body: excerpt(body),
            });
        }
        Err(e) => {
            return Err(DeliveryError::InvalidResponse {
                status,
                message: format!("{e}: {}", excerpt(body)),
            });
        }
    };

    if let Some(error) = parsed.error {
        return Err(DeliveryError::Api {
            message: error.message,
            code: error.code,
            fbtrace_id: error.fbtrace_id.or(parsed.fbtrace_id),
        });
    }

    if !success {
        return Err(DeliveryError::Status {
            status,
            body: excerpt(body),
        });
    }

    let mut warnings = Vec::new();
    for msg in &parsed.messages {
        let text = msg.message.clone().unwrap_or_default();
        match msg.kind.as_deref() {
            Some(kind) if kind.eq_ignore_ascii_case("warning") => {
                warn!(message = %text, "API warning");
                warnings.push(text);
            }
            kind => info!(kind = ?kind, message = %text, "API message"),
        }
    }

    let report = DeliveryReport {
        events_received: parsed.events_received,
        warnings,
        trace_id: parsed.fbtrace_id,
    };

    if report.warnings.is_empty() {
        Ok(DeliveryOutcome::Accepted(report))
    } else {
        Ok(DeliveryOutcome::AcceptedWithWarnings(report))
    }
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
