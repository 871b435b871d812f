use std::sync::{Arc, Mutex};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};

/// Randomly fails fault-eligible writes with [`Error::SimulatedFailure`].
///
/// Handlers call [`FaultInjector::check`] before touching the request body,
/// so an injected failure does not depend on whether the input is valid.
#[derive(Clone, Debug)]
pub struct FaultInjector {
    rate: f64,
    rng: Arc<Mutex<StdRng>>,
}

impl FaultInjector {
    pub fn new(rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self {
            rate: if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) },
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.write_failure_rate, config.fault_seed)
    }

    /// Never fails.
    pub fn disabled() -> Self {
        Self::new(0.0, Some(0))
    }

    pub fn check(&self, operation: &'static str) -> Result<()> {
        let fail = match self.rng.lock() {
            Ok(mut rng) => rng.gen_bool(self.rate),
            Err(poisoned) => poisoned.into_inner().gen_bool(self.rate),
        };
        if fail {
            warn!(operation, "Injecting simulated write failure");
            return Err(Error::SimulatedFailure);
        }
        Ok(())
    }
}
