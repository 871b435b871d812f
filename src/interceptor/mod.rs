//! In-process request interception.
//!
//! The [`Interceptor`] owns the local store and the fixed route table. Matched
//! requests are delayed by the latency simulator and served by the mock
//! handlers; anything the table does not list goes to the passthrough.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{self, header},
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceExt;
use tracing::info;

use crate::client::{ApiError, ApiRequest, RawResponse, Transport};
use crate::config::Config;
use crate::database::pool::{create_pool, run_migrations};
use crate::error::Result;
use crate::middleware::latency::{new_latency_state, simulate_latency, LatencySimulator};
use crate::routes::{assessments, candidates, jobs, passthrough::passthrough};
use crate::services::seed_service::SeedService;
use crate::store::LocalStore;
use crate::AppState;

const MAX_RESPONSE_BODY: usize = 64 * 1024 * 1024;

pub struct Interceptor {
    store: LocalStore,
    router: Router,
}

impl Interceptor {
    /// Opens the store, applies migrations, seeds an empty store when
    /// configured to, and builds the route table.
    pub async fn start(config: &Config) -> Result<Self> {
        config.validate()?;
        let pool = create_pool(config).await?;
        run_migrations(&pool).await?;
        let store = LocalStore::new(pool);

        if config.seed_on_start {
            SeedService::new(store.clone(), config.seed_candidates, config.fault_seed)
                .ensure_seeded()
                .await?;
        }

        let interceptor = Self::with_store(store, config)?;
        info!(
            latency_min_ms = config.latency_min_ms,
            latency_max_ms = config.latency_max_ms,
            write_failure_rate = config.write_failure_rate,
            passthrough = config.passthrough_url.as_deref().unwrap_or("none"),
            "Request interceptor started"
        );
        Ok(interceptor)
    }

    pub fn with_store(store: LocalStore, config: &Config) -> Result<Self> {
        config.validate()?;
        let state = AppState::new(store.clone(), config)?;
        let router = route_table(state, new_latency_state(config));
        Ok(Self { store, router })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub async fn dispatch(&self, req: Request) -> Response {
        match self.router.clone().oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    pub async fn stop(self) {
        self.store.close().await;
        info!("Request interceptor stopped");
    }
}

/// Mock routes, each behind the latency simulator. A known path requested
/// with an unlisted method falls through like an unknown path.
pub fn route_table(state: AppState, latency: LatencySimulator) -> Router {
    Router::new()
        .route(
            "/jobs",
            get(jobs::list_jobs)
                .post(jobs::create_job)
                .fallback(passthrough),
        )
        .route(
            "/jobs/:id",
            get(jobs::get_job)
                .patch(jobs::update_job)
                .fallback(passthrough),
        )
        .route(
            "/jobs/:id/reorder",
            patch(jobs::reorder_jobs).fallback(passthrough),
        )
        .route(
            "/candidates",
            get(candidates::list_candidates).fallback(passthrough),
        )
        .route(
            "/candidates/:id",
            patch(candidates::update_candidate).fallback(passthrough),
        )
        .route(
            "/candidates/:id/timeline",
            get(candidates::get_timeline).fallback(passthrough),
        )
        .route(
            "/candidates/:id/notes",
            post(candidates::add_note).fallback(passthrough),
        )
        .route(
            "/assessments/:job_id",
            get(assessments::get_assessment)
                .put(assessments::save_assessment)
                .fallback(passthrough),
        )
        .route(
            "/assessments/:job_id/submit",
            post(assessments::submit_response).fallback(passthrough),
        )
        .route_layer(from_fn_with_state(latency, simulate_latency))
        .fallback(passthrough)
        .with_state(state)
}

#[async_trait]
impl Transport for Interceptor {
    async fn send(&self, request: ApiRequest) -> std::result::Result<RawResponse, ApiError> {
        let body = match &request.body {
            Some(value) => Body::from(
                serde_json::to_vec(value).map_err(|err| ApiError::JsonParse(err.to_string()))?,
            ),
            None => Body::empty(),
        };
        let req = http::Request::builder()
            .method(request.method)
            .uri(request.path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let response = self.dispatch(req).await;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), MAX_RESPONSE_BODY)
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn with_store_rejects_an_invalid_config() {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            ..Config::default()
        };
        let store = LocalStore::new(create_pool(&config).await.unwrap());

        let nan_rate = Config {
            write_failure_rate: f64::NAN,
            ..config.clone()
        };
        assert!(matches!(
            Interceptor::with_store(store.clone(), &nan_rate),
            Err(Error::Config(_))
        ));
        assert!(Interceptor::with_store(store, &config).is_ok());
    }
}
