use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::trace;

use crate::config::Config;

/// Draws the artificial network delay applied to every matched route.
#[derive(Clone, Debug)]
pub struct LatencySimulator {
    min_ms: u64,
    max_ms: u64,
    rng: Arc<Mutex<StdRng>>,
}

impl LatencySimulator {
    pub fn new(min_ms: u64, max_ms: u64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// A delay within `[min_ms, max_ms]`, inclusive at both ends.
    pub fn sample(&self) -> Duration {
        let millis = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(self.min_ms..=self.max_ms),
            Err(poisoned) => poisoned.into_inner().gen_range(self.min_ms..=self.max_ms),
        };
        Duration::from_millis(millis)
    }
}

pub async fn simulate_latency(
    State(state): State<LatencySimulator>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let delay = state.sample();
    trace!(delay_ms = delay.as_millis() as u64, path = %req.uri().path(), "Simulating latency");
    tokio::time::sleep(delay).await;
    next.run(req).await
}

pub fn new_latency_state(config: &Config) -> LatencySimulator {
    LatencySimulator::new(config.latency_min_ms, config.latency_max_ms, config.fault_seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_inside_the_window() {
        let latency = LatencySimulator::new(200, 1200, Some(1));
        for _ in 0..1_000 {
            let ms = latency.sample().as_millis();
            assert!((200..=1200).contains(&ms), "{} out of range", ms);
        }
    }

    #[test]
    fn zero_window_means_no_delay() {
        let latency = LatencySimulator::new(0, 0, None);
        assert_eq!(latency.sample(), Duration::ZERO);
    }
}
