use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    AppState,
};

const MAX_FORWARDED_BODY: usize = 10 * 1024 * 1024;
const HOP_BY_HOP: &[&str] = &["host", "connection", "content-length", "transfer-encoding"];

/// Forwards requests no route claims to an optional upstream.
#[derive(Clone)]
pub struct Passthrough {
    client: reqwest::Client,
    upstream: Option<String>,
}

impl Passthrough {
    pub fn new(upstream: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            upstream: upstream.map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    /// Sends the request on unmodified, apart from the target origin.
    pub async fn forward(&self, req: Request) -> Result<Response> {
        let method = req.method().clone();
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());

        let Some(upstream) = self.upstream.as_deref() else {
            debug!(%method, path = %path_and_query, "No route and no passthrough upstream");
            return Err(Error::Passthrough(format!(
                "No mock route for {} {} and no passthrough upstream configured",
                method, path_and_query
            )));
        };

        let (parts, body) = req.into_parts();
        let body = to_bytes(body, MAX_FORWARDED_BODY)
            .await
            .map_err(|err| Error::BadRequest(format!("Unreadable request body: {}", err)))?;

        let upstream_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|err| Error::Passthrough(err.to_string()))?;
        let mut outgoing = self
            .client
            .request(upstream_method, format!("{}{}", upstream, path_and_query))
            .body(body);
        for (name, value) in parts.headers.iter() {
            if HOP_BY_HOP.contains(&name.as_str()) {
                continue;
            }
            outgoing = outgoing.header(name.as_str(), value.as_bytes());
        }

        let upstream_response = outgoing.send().await.map_err(|err| {
            warn!(error = %err, path = %path_and_query, "Passthrough request failed");
            Error::Passthrough(format!("Upstream request failed: {}", err))
        })?;

        let status = StatusCode::from_u16(upstream_response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let headers: Vec<(String, Vec<u8>)> = upstream_response
            .headers()
            .iter()
            .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();
        let bytes = upstream_response.bytes().await?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(&value),
            ) {
                response.headers_mut().append(name, value);
            }
        }
        Ok(response)
    }
}

pub async fn passthrough(State(state): State<AppState>, req: Request) -> Result<Response> {
    state.passthrough.forward(req).await
}
