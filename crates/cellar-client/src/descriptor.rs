//! Request descriptors and caller overrides
//!
//! A [`RequestDescriptor`] is the complete description of one outgoing call.
//! Every operation of [`crate::CellarClient`] builds a fresh one, optionally
//! merges an [`OverrideConfig`] on top of it, and hands it to the transport.

use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CellarError;

/// HTTP methods used by the cellar API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = CellarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(CellarError::InvalidMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = CellarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// How the transport decodes the response body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Decode as JSON (the only format the generated operations request)
    #[default]
    Json,
    /// Keep the raw text, returned as a JSON string
    Text,
}

/// Fully specified request handed to the transport
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub timeout_ms: u64,
    pub url: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub response_format: ResponseFormat,
}

impl RequestDescriptor {
    /// Create a descriptor with no body, no query and a JSON response format
    pub fn new(method: HttpMethod, url: String, timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            url,
            method,
            body: None,
            query: None,
            headers: BTreeMap::new(),
            response_format: ResponseFormat::Json,
        }
    }

    /// Set the request body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add one query parameter, creating the query map if needed
    pub fn with_query_param(mut self, name: &str, value: Value) -> Self {
        self.query
            .get_or_insert_with(Map::new)
            .insert(name.to_string(), value);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Shallow merge of `overrides` onto this descriptor.
    ///
    /// Each field present in `overrides` replaces the canonical field as a
    /// whole; `query` and `headers` maps are swapped, never combined key by
    /// key. Absent fields keep their canonical value, so merging
    /// `OverrideConfig::default()` is the identity.
    pub fn merge(mut self, overrides: OverrideConfig) -> Self {
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(url) = overrides.url {
            self.url = url;
        }
        if let Some(method) = overrides.method {
            self.method = method;
        }
        if let Some(body) = overrides.body {
            self.body = Some(body);
        }
        if let Some(query) = overrides.query {
            self.query = Some(query);
        }
        if let Some(headers) = overrides.headers {
            self.headers = headers;
        }
        if let Some(response_format) = overrides.response_format {
            self.response_format = response_format;
        }
        self
    }
}

/// Caller-supplied partial descriptor applied to a single call
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OverrideConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl OverrideConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = Some(query);
        self
    }

    /// Add a header; the resulting map replaces all canonical headers
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = Some(response_format);
        self
    }
}
