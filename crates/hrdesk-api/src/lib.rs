// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use hrdesk_app::{DateForm, EntitySchema, GatewayError, NaturalKey, Record, RecordGateway};
use reqwest::Method;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// [`RecordGateway`] over the records service's REST API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url =
            Url::parse(trimmed).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("api.base_url {trimmed:?} cannot carry a path");
        }
        if timeout.is_zero() {
            bail!("api.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn record_url(&self, schema: &EntitySchema, key: &NaturalKey) -> Url {
        self.endpoint(
            std::iter::once(schema.collection).chain(key.parts().iter().map(String::as_str)),
        )
    }

    /// Sends one request and returns the body of a success response.
    fn send(&self, method: Method, url: Url, body: Option<&Record>) -> Result<String, GatewayError> {
        let started = Instant::now();
        let mut request: RequestBuilder = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().map_err(|error| {
            warn!(%method, %url, "request did not complete: {error}");
            connection_error(error)
        })?;

        let status = response.status();
        let text = match response.text() {
            Ok(text) => text,
            Err(error) if status.is_success() => {
                warn!(%method, %url, "response body was cut short: {error}");
                return Err(connection_error(error));
            }
            Err(_) => String::new(),
        };
        debug!(
            %method,
            %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "records service responded"
        );
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        Ok(text)
    }
}

impl RecordGateway for HttpGateway {
    fn list(&self, schema: &EntitySchema) -> Result<Vec<Record>, GatewayError> {
        let body = self.send(Method::GET, self.endpoint([schema.collection]), None)?;
        serde_json::from_str(&body)
            .map_err(|error| GatewayError::Decode(format!("{} list: {error}", schema.collection)))
    }

    fn create(
        &self,
        schema: &EntitySchema,
        record: &Record,
    ) -> Result<Option<Record>, GatewayError> {
        let body = self.send(Method::POST, self.endpoint([schema.create_path]), Some(record))?;
        Ok(echoed_record(schema, &body))
    }

    fn update(
        &self,
        schema: &EntitySchema,
        key: &NaturalKey,
        patch: &Record,
    ) -> Result<Option<Record>, GatewayError> {
        let body = self.send(Method::PUT, self.record_url(schema, key), Some(patch))?;
        Ok(echoed_record(schema, &body))
    }

    fn delete(&self, schema: &EntitySchema, key: &NaturalKey) -> Result<(), GatewayError> {
        self.send(Method::DELETE, self.record_url(schema, key), None)?;
        Ok(())
    }
}

/// A success body counts as the stored record only when it carries the
/// entity's full natural key; `{"message": ...}` acknowledgements do not.
fn echoed_record(schema: &EntitySchema, body: &str) -> Option<Record> {
    let record: Record = serde_json::from_str(body).ok()?;
    schema.natural_key(&record, DateForm::Storage)?;
    Some(record)
}

fn connection_error(error: reqwest::Error) -> GatewayError {
    let detail = if error.is_timeout() {
        format!("timed out: {error}")
    } else {
        error.to_string()
    };
    GatewayError::Transport(detail)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    #[serde(rename = "detailedError")]
    detailed_error: Option<String>,
    error: Option<String>,
}

/// Pulls a human-readable message out of an error body, if it has one.
fn error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        return [parsed.message, parsed.detailed_error, parsed.error]
            .into_iter()
            .flatten()
            .map(|message| message.trim().to_owned())
            .find(|message| !message.is_empty());
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 200 && !trimmed.contains(['{', '<']) {
        return Some(trimmed.to_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{HttpGateway, echoed_record, error_message};
    use hrdesk_app::{EntityKind, NaturalKey};
    use std::time::Duration;

    #[test]
    fn rejects_unusable_base_urls() {
        let timeout = Duration::from_secs(1);
        for bad in ["", "   ", "ftp://records.local", "not a url", "mailto:hr@example.com"] {
            assert!(HttpGateway::new(bad, timeout).is_err(), "{bad:?} accepted");
        }
        assert!(HttpGateway::new("http://localhost:5000", Duration::ZERO).is_err());
    }

    #[test]
    fn key_parts_become_encoded_path_segments() {
        let gateway = HttpGateway::new("http://localhost:5000/api/", Duration::from_secs(1))
            .expect("gateway should initialize");
        let schema = EntityKind::Qualification.schema();
        let url = gateway.record_url(schema, &NaturalKey::new(["4", "Anna University"]));
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/qualifications/4/Anna%20University"
        );
        assert_eq!(
            gateway.endpoint([schema.create_path]).as_str(),
            "http://localhost:5000/api/add-qualification"
        );
    }

    #[test]
    fn error_message_prefers_message_then_detail() {
        assert_eq!(
            error_message(r#"{"message":"Employee not found"}"#).as_deref(),
            Some("Employee not found")
        );
        assert_eq!(
            error_message(r#"{"message":"","detailedError":"ER_DUP_ENTRY"}"#).as_deref(),
            Some("ER_DUP_ENTRY")
        );
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message(""), None);
        assert_eq!(error_message("<html><body>oops</body></html>"), None);
        assert_eq!(error_message(r#"{"status":500}"#), None);
    }

    #[test]
    fn acknowledgement_bodies_are_not_records() {
        let schema = EntityKind::Attendance.schema();
        assert_eq!(echoed_record(schema, r#"{"message":"Record added"}"#), None);
        assert_eq!(echoed_record(schema, "OK"), None);
        let record = echoed_record(
            schema,
            r#"{"EID":7,"A_DATE":"2024-01-05T00:00:00.000Z","STATUS":"Present"}"#,
        )
        .expect("full key present");
        assert_eq!(record.display("STATUS"), "Present");
    }
}
