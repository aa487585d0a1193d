//! Transport seam and the default reqwest-backed implementation
//!
//! The client only builds [`RequestDescriptor`]s; a [`Transport`] performs the
//! single network call and classifies the outcome. Any status outside 2xx is
//! an error, and nothing is retried.

use std::collections::BTreeMap;

use reqwest::{Client, Response, header::ACCEPT};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    descriptor::{RequestDescriptor, ResponseFormat},
    error::{CellarError, Result},
};

/// Successful response handed back to the caller
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: BTreeMap<String, String>,
    /// Decoded body; `null` when the server sent none
    pub body: Value,
}

impl ApiResponse {
    /// Decode the body into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Performs one HTTP exchange for a descriptor
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request. Resolves for 2xx responses, fails for any other
    /// status and for network errors or timeouts.
    async fn execute(&self, descriptor: RequestDescriptor) -> Result<ApiResponse>;
}

/// Transport built on a shared `reqwest::Client`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default reqwest client
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (proxies, TLS roots, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn handle_response(
        &self,
        response: Response,
        format: ResponseFormat,
        timeout_ms: u64,
    ) -> Result<ApiResponse> {
        let status = response.status();
        let headers = collect_headers(
            response
                .headers()
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_bytes())),
        );
        let text = response
            .text()
            .await
            .map_err(|e| classify_error(e, timeout_ms))?;

        if status.is_success() {
            let body = decode_body(text, format);
            Ok(ApiResponse {
                status: status.as_u16(),
                headers,
                body,
            })
        } else {
            warn!("Request failed with status {}: {}", status, text);
            let body = serde_json::from_str(&text).unwrap_or_else(|_| raw_body(text));
            Err(CellarError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        let timeout_ms = descriptor.timeout_ms;
        let format = descriptor.response_format;

        debug!("{} {}", descriptor.method, descriptor.url);

        let mut request = self
            .client
            .request(descriptor.method.into(), &descriptor.url)
            .timeout(descriptor.timeout());

        if format == ResponseFormat::Json
            && !descriptor
                .headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case(ACCEPT.as_str()))
        {
            request = request.header(ACCEPT, "application/json");
        }
        for (name, value) in &descriptor.headers {
            request = request.header(name, value);
        }
        if let Some(query) = &descriptor.query {
            request = request.query(&encode_query(query));
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(e, timeout_ms))?;

        self.handle_response(response, format, timeout_ms).await
    }
}

fn classify_error(error: reqwest::Error, timeout_ms: u64) -> CellarError {
    if error.is_timeout() {
        warn!("Request timed out after {}ms", timeout_ms);
        CellarError::Timeout { timeout_ms }
    } else {
        warn!("Request failed: {}", error);
        CellarError::Transport(error)
    }
}

/// A success body that is not valid JSON is kept as raw text
fn decode_body(text: String, format: ResponseFormat) -> Value {
    match format {
        ResponseFormat::Text => Value::String(text),
        ResponseFormat::Json if text.trim().is_empty() => Value::Null,
        ResponseFormat::Json => serde_json::from_str(&text).unwrap_or_else(|e| {
            debug!("Response body is not JSON ({}), keeping raw text", e);
            Value::String(text)
        }),
    }
}

/// Repeated headers (e.g. `set-cookie`) are joined with ", "
fn collect_headers<'a>(
    headers: impl Iterator<Item = (&'a str, &'a [u8])>,
) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value);
        collected
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}

fn raw_body(text: String) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text)
    }
}

/// Flatten query values into name/value pairs.
///
/// Arrays expand to one pair per element, `null` is skipped, strings are sent
/// as-is and every other value is sent as its JSON text.
fn encode_query(query: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in query {
        match value {
            Value::Array(items) => pairs.extend(
                items
                    .iter()
                    .filter_map(query_value)
                    .map(|v| (name.clone(), v)),
            ),
            other => {
                if let Some(v) = query_value(other) {
                    pairs.push((name.clone(), v));
                }
            }
        }
    }
    pairs
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
