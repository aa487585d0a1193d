// CellarClient - one method per cellar API action

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    action::Action,
    config::ConnectionConfig,
    descriptor::{OverrideConfig, RequestDescriptor},
    error::Result,
    transport::{ApiResponse, ReqwestTransport, Transport},
};

/// HTTP client for the cellar API.
///
/// Every operation takes the full request path (ids already substituted),
/// builds a fresh [`RequestDescriptor`], merges the optional override on top
/// and performs exactly one call through the transport. Clones share the same
/// read-only configuration and transport.
#[derive(Clone)]
pub struct CellarClient {
    config: Arc<ConnectionConfig>,
    transport: Arc<dyn Transport>,
}

impl CellarClient {
    /// Create a client backed by [`ReqwestTransport`]
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client with the default connection config
    pub fn from_defaults() -> Result<Self> {
        Self::new(ConnectionConfig::default())
    }

    /// Create a client on top of any transport. A zero timeout in `config`
    /// is replaced by the default one.
    pub fn with_transport(config: ConnectionConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config.normalized()),
            transport,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Canonical descriptor of `action` before any override.
    ///
    /// `data` becomes the body only for actions that take a payload, `years`
    /// becomes the `years` query parameter only for [`Action::ListBottle`].
    /// Both are forwarded as given.
    pub fn descriptor(
        &self,
        action: Action,
        path: &str,
        data: Option<Value>,
        years: Option<Value>,
    ) -> RequestDescriptor {
        let url = format!("{}{}", self.config.url_prefix(), path);
        let mut descriptor = RequestDescriptor::new(action.method(), url, self.config.timeout_ms);

        if action.takes_payload() {
            if let Some(data) = data {
                descriptor = descriptor.with_body(data);
            }
        }
        if action.takes_years() {
            if let Some(years) = years {
                descriptor = descriptor.with_query_param("years", years);
            }
        }
        descriptor
    }

    /// Perform `action` by name. The named operations below all go through here.
    pub async fn call(
        &self,
        action: Action,
        path: &str,
        data: Option<Value>,
        years: Option<Value>,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        let mut descriptor = self.descriptor(action, path, data, years);
        if let Some(overrides) = config {
            descriptor = descriptor.merge(overrides);
        }

        debug!(
            "{}: {} {}",
            action.name(),
            descriptor.method,
            descriptor.url
        );

        self.transport.execute(descriptor).await
    }

    async fn call_with_payload<B: Serialize + ?Sized>(
        &self,
        action: Action,
        path: &str,
        data: &B,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        let data = serde_json::to_value(data)?;
        self.call(action, path, Some(data), None, config).await
    }

    // ============================================================================
    // Account APIs
    // ============================================================================

    /// Create new account. Path format: "/cellar/accounts"
    pub async fn create_account<B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call_with_payload(Action::CreateAccount, path, data, config).await
    }

    /// Retrieve account with given id. Path format: "/cellar/accounts/:accountID"
    pub async fn show_account(
        &self,
        path: &str,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call(Action::ShowAccount, path, None, None, config).await
    }

    /// Change account name. Path format: "/cellar/accounts/:accountID"
    pub async fn update_account<B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call_with_payload(Action::UpdateAccount, path, data, config).await
    }

    pub async fn delete_account(
        &self,
        path: &str,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call(Action::DeleteAccount, path, None, None, config).await
    }

    // ============================================================================
    // Bottle APIs
    // ============================================================================

    /// Record new bottle. Path format: "/cellar/accounts/:accountID/bottles"
    pub async fn create_bottle<B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call_with_payload(Action::CreateBottle, path, data, config).await
    }

    /// Retrieve bottle with given id.
    /// Path format: "/cellar/accounts/:accountID/bottles/:bottleID"
    pub async fn show_bottle(
        &self,
        path: &str,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call(Action::ShowBottle, path, None, None, config).await
    }

    pub async fn update_bottle<B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call_with_payload(Action::UpdateBottle, path, data, config).await
    }

    pub async fn delete_bottle(
        &self,
        path: &str,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call(Action::DeleteBottle, path, None, None, config).await
    }

    /// List all bottles in account optionally filtering by year.
    /// Path format: "/cellar/accounts/:accountID/bottles"
    pub async fn list_bottle(
        &self,
        path: &str,
        years: Option<Value>,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call(Action::ListBottle, path, None, years, config).await
    }

    /// Path format: "/cellar/accounts/:accountID/bottles/:bottleID/actions/rate"
    pub async fn rate_bottle<B: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &B,
        config: Option<OverrideConfig>,
    ) -> Result<ApiResponse> {
        self.call_with_payload(Action::RateBottle, path, data, config).await
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Mutex, time::Duration};

    use serde_json::json;

    use super::*;
    use crate::{
        descriptor::{HttpMethod, ResponseFormat},
        error::CellarError,
        model::{AccountPayload, RatePayload},
    };

    /// Records every descriptor and answers with a fixed status and body
    struct RecordingTransport {
        status: u16,
        body: Value,
        delay: Option<Duration>,
        calls: Mutex<Vec<RequestDescriptor>>,
    }

    impl RecordingTransport {
        fn new(status: u16, body: Value) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                delay: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn delayed(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                status: 200,
                body: Value::Null,
                delay: Some(delay),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<RequestDescriptor> {
            self.calls.lock().unwrap().clone()
        }

        fn last(&self) -> RequestDescriptor {
            self.calls().pop().expect("no call recorded")
        }
    }

    #[async_trait::async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
            self.calls.lock().unwrap().push(descriptor.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if (200..300).contains(&self.status) {
                Ok(ApiResponse {
                    status: self.status,
                    headers: BTreeMap::new(),
                    // Echo the url so concurrent callers can check their own response
                    body: if self.body.is_null() {
                        json!({"url": descriptor.url})
                    } else {
                        self.body.clone()
                    },
                })
            } else {
                Err(CellarError::Status {
                    status: self.status,
                    body: self.body.clone(),
                })
            }
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> CellarClient {
        CellarClient::with_transport(ConnectionConfig::default(), transport)
    }

    #[tokio::test]
    async fn test_operations_method_and_url() {
        let transport = RecordingTransport::new(200, json!({}));
        let client = client(transport.clone());
        let data = json!({"name": "x"});

        client.create_account("/cellar/accounts", &data, None).await.unwrap();
        client.create_bottle("/cellar/accounts/1/bottles", &data, None).await.unwrap();
        client.show_account("/cellar/accounts/1", None).await.unwrap();
        client.show_bottle("/cellar/accounts/1/bottles/2", None).await.unwrap();
        client.update_account("/cellar/accounts/1", &data, None).await.unwrap();
        client.update_bottle("/cellar/accounts/1/bottles/2", &data, None).await.unwrap();
        client.delete_account("/cellar/accounts/1", None).await.unwrap();
        client.delete_bottle("/cellar/accounts/1/bottles/2", None).await.unwrap();
        client.list_bottle("/cellar/accounts/1/bottles", None, None).await.unwrap();
        client
            .rate_bottle("/cellar/accounts/1/bottles/2/actions/rate", &data, None)
            .await
            .unwrap();

        let expected = [
            (HttpMethod::Post, "/cellar/accounts"),
            (HttpMethod::Post, "/cellar/accounts/1/bottles"),
            (HttpMethod::Get, "/cellar/accounts/1"),
            (HttpMethod::Get, "/cellar/accounts/1/bottles/2"),
            (HttpMethod::Put, "/cellar/accounts/1"),
            (HttpMethod::Patch, "/cellar/accounts/1/bottles/2"),
            (HttpMethod::Delete, "/cellar/accounts/1"),
            (HttpMethod::Delete, "/cellar/accounts/1/bottles/2"),
            (HttpMethod::Get, "/cellar/accounts/1/bottles"),
            (HttpMethod::Put, "/cellar/accounts/1/bottles/2/actions/rate"),
        ];

        let calls = transport.calls();
        assert_eq!(calls.len(), expected.len());
        for (descriptor, (method, path)) in calls.iter().zip(expected) {
            assert_eq!(descriptor.method, method);
            assert_eq!(descriptor.url, format!("https://cellar.goa.design{path}"));
            assert_eq!(descriptor.timeout_ms, 20000);
            assert_eq!(descriptor.response_format, ResponseFormat::Json);
        }
    }

    #[tokio::test]
    async fn test_payload_forwarded_verbatim() {
        let transport = RecordingTransport::new(200, json!({}));
        let client = client(transport.clone());
        let data = json!({"name": "Acme", "extra": [1, {"deep": null}]});

        client.update_account("/cellar/accounts/1", &data, None).await.unwrap();
        assert_eq!(transport.last().body, Some(data));

        client
            .rate_bottle("/x", &RatePayload::new(9), None)
            .await
            .unwrap();
        assert_eq!(transport.last().body, Some(json!({"rating": 9})));

        client.show_account("/cellar/accounts/1", None).await.unwrap();
        assert_eq!(transport.last().body, None);
    }

    #[tokio::test]
    async fn test_path_is_not_escaped() {
        let transport = RecordingTransport::new(200, json!({}));
        let client = client(transport.clone());

        client.show_account("/cellar/accounts/a b?x=1", None).await.unwrap();
        assert_eq!(
            transport.last().url,
            "https://cellar.goa.design/cellar/accounts/a b?x=1"
        );
    }

    #[tokio::test]
    async fn test_list_bottle_years() {
        let transport = RecordingTransport::new(200, json!([]));
        let client = client(transport.clone());

        client
            .list_bottle("/cellar/accounts/1/bottles", Some(json!([2015, 2016])), None)
            .await
            .unwrap();
        let query = transport.last().query.unwrap();
        assert_eq!(query["years"], json!([2015, 2016]));

        // Not coerced or validated
        client
            .list_bottle("/cellar/accounts/1/bottles", Some(json!("last-year")), None)
            .await
            .unwrap();
        assert_eq!(transport.last().query.unwrap()["years"], json!("last-year"));

        client
            .list_bottle("/cellar/accounts/1/bottles", None, None)
            .await
            .unwrap();
        assert!(transport.last().query.is_none());
    }

    #[tokio::test]
    async fn test_override_merged_over_canonical() {
        let transport = RecordingTransport::new(200, json!({}));
        let client = client(transport.clone());

        client
            .create_account(
                "/cellar/accounts",
                &AccountPayload::new("Acme"),
                Some(
                    OverrideConfig::new()
                        .with_timeout_ms(100)
                        .with_header("x-request-id", "42"),
                ),
            )
            .await
            .unwrap();

        let descriptor = transport.last();
        assert_eq!(descriptor.timeout_ms, 100);
        assert_eq!(descriptor.headers["x-request-id"], "42");
        assert_eq!(descriptor.method, HttpMethod::Post);
        assert_eq!(descriptor.url, "https://cellar.goa.design/cellar/accounts");
        assert_eq!(descriptor.body, Some(json!({"name": "Acme"})));

        client
            .show_account("/cellar/accounts/1", Some(OverrideConfig::default()))
            .await
            .unwrap();
        assert_eq!(
            transport.last(),
            client.descriptor(Action::ShowAccount, "/cellar/accounts/1", None, None)
        );
    }

    #[tokio::test]
    async fn test_create_account_resolves_with_body() {
        let transport = RecordingTransport::new(201, json!({"id": 1, "name": "Acme"}));
        let client = client(transport);

        let response = client
            .create_account("/cellar/accounts", &json!({"name": "Acme"}), None)
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!({"id": 1, "name": "Acme"}));
    }

    #[tokio::test]
    async fn test_show_account_rejects_with_status() {
        let transport = RecordingTransport::new(404, json!({"id": "not_found"}));
        let client = client(transport);

        let err = client
            .show_account("/cellar/accounts/42", None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        match err {
            CellarError::Status { body, .. } => assert_eq!(body, json!({"id": "not_found"})),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_calls_do_not_share_descriptors() {
        let transport = RecordingTransport::delayed(Duration::from_millis(20));
        let client = client(transport.clone());
        let other = client.clone();
        let first = json!({"name": "one"});
        let second = json!({"name": "two"});

        let (a, b) = tokio::join!(
            client.update_account("/cellar/accounts/1", &first, None),
            other.update_bottle(
                "/cellar/accounts/2/bottles/3",
                &second,
                Some(OverrideConfig::new().with_timeout_ms(7)),
            ),
        );

        assert_eq!(
            a.unwrap().body["url"],
            "https://cellar.goa.design/cellar/accounts/1"
        );
        assert_eq!(
            b.unwrap().body["url"],
            "https://cellar.goa.design/cellar/accounts/2/bottles/3"
        );

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        let one = calls.iter().find(|d| d.method == HttpMethod::Put).unwrap();
        let two = calls.iter().find(|d| d.method == HttpMethod::Patch).unwrap();
        assert_eq!(one.body, Some(json!({"name": "one"})));
        assert_eq!(one.timeout_ms, 20000);
        assert_eq!(two.body, Some(json!({"name": "two"})));
        assert_eq!(two.timeout_ms, 7);
    }

    #[test]
    fn test_descriptor_ignores_arguments_the_action_does_not_take() {
        let client = client(RecordingTransport::new(200, json!({})));

        let descriptor = client.descriptor(
            Action::ShowBottle,
            "/cellar/accounts/1/bottles/2",
            Some(json!({"ignored": true})),
            Some(json!([2000])),
        );
        assert!(descriptor.body.is_none());
        assert!(descriptor.query.is_none());
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config = ConnectionConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let client = CellarClient::with_transport(config, RecordingTransport::new(200, json!({})));

        let descriptor = client.descriptor(Action::ShowAccount, "/cellar/accounts/1", None, None);
        assert_eq!(descriptor.timeout_ms, 20000);
    }

    #[test]
    fn test_custom_connection_config() {
        let config = ConnectionConfig::new("http", "localhost:8080").with_timeout_ms(1500);
        let client = CellarClient::with_transport(config, RecordingTransport::new(200, json!({})));

        let descriptor = client.descriptor(Action::DeleteAccount, "/cellar/accounts/9", None, None);
        assert_eq!(descriptor.url, "http://localhost:8080/cellar/accounts/9");
        assert_eq!(descriptor.timeout_ms, 1500);
        assert_eq!(client.config().scheme, "http");
    }
}
