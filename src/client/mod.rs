//! Typed async access to the mock API.
//!
//! [`ApiClient`] sends [`ApiRequest`]s through a [`Transport`] (normally the
//! in-process [`Interceptor`](crate::interceptor::Interceptor)), classifies
//! failures into [`ApiError`], retries reads with backoff, caches read
//! results per [`QueryKey`] and invalidates them after successful writes.

pub mod assessments;
pub mod cache;
pub mod candidates;
pub mod error;
pub mod jobs;
pub mod optimistic;
pub mod retry;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

pub use cache::{QueryCache, QueryKey};
pub use error::ApiError;
pub use optimistic::{run_optimistic, OptimisticMutation};
pub use retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path plus query string, e.g. `/jobs?page=2`.
    pub path: String,
    pub body: Option<JsonValue>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body<B: Serialize>(method: Method, path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|err| ApiError::JsonParse(err.to_string()))?;
        Ok(Self {
            method,
            path: path.into(),
            body: Some(body),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// The `content-type` header, when the response carried one.
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RawResponse {
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound on one attempt; retries each get their own.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub stale_time: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            stale_time: Duration::from_secs(10),
        }
    }
}

pub struct ApiClient<T> {
    transport: Arc<T>,
    cache: QueryCache,
    config: ClientConfig,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            cache: self.cache.clone(),
            config: self.config,
        }
    }
}

impl<T> ApiClient<T>
where
    T: Transport + Send + Sync + 'static,
{
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: QueryCache::new(config.stale_time),
            config,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One attempt, bounded by the configured timeout. A request that times
    /// out keeps running in its own task; only the caller stops waiting.
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let transport = Arc::clone(&self.transport);
        let task = tokio::spawn(async move { transport.send(request).await });
        match tokio::time::timeout(self.config.timeout, task).await {
            Err(_) => Err(ApiError::Timeout),
            Ok(Err(join_err)) => Err(ApiError::Network(join_err.to_string())),
            Ok(Ok(result)) => result,
        }
    }

    async fn request_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        debug!(method = %request.method, path = %request.path, "Sending request");
        let response = self.execute(request).await?;
        if !(200..300).contains(&response.status) {
            // An empty error body still classifies by status alone.
            if !response.body.is_empty() {
                if let Err(err) = serde_json::from_slice::<JsonValue>(&response.body) {
                    return Err(ApiError::unparseable(&response, err));
                }
            }
            return Err(ApiError::from_response(response.status, &response.body));
        }
        serde_json::from_slice(&response.body).map_err(|err| ApiError::unparseable(&response, err))
    }

    /// Cached, retried read.
    pub(crate) async fn fetch<R>(&self, key: QueryKey, request: ApiRequest) -> Result<R, ApiError>
    where
        R: Serialize + DeserializeOwned,
    {
        if let Some(hit) = self.cache.get_fresh(&key) {
            debug!(resource = key.resource, params = %key.params, "Cache hit");
            return Ok(hit);
        }
        let value: R = self
            .config
            .retry
            .run(|| self.request_json(request.clone()))
            .await?;
        self.cache.set(key, &value);
        Ok(value)
    }

    /// Writes go out once; callers invalidate caches on success.
    pub(crate) async fn send_once<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        self.request_json(request).await
    }
}

/// Builds a query string from a serializable filter, skipping absent and
/// empty values and joining lists with commas.
pub fn query_string<Q: Serialize>(query: &Q) -> String {
    let Ok(JsonValue::Object(fields)) = serde_json::to_value(query) else {
        return String::new();
    };
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        let rendered = match value {
            JsonValue::Null => continue,
            JsonValue::String(s) => s,
            JsonValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        if rendered.is_empty() {
            continue;
        }
        serializer.append_pair(&name, &rendered);
    }
    serializer.finish()
}

pub(crate) fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}
