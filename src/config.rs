use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub write_failure_rate: f64,
    pub fault_seed: Option<u64>,
    pub passthrough_url: Option<String>,
    pub seed_on_start: bool,
    pub seed_candidates: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:3000".to_string(),
            database_url: "sqlite://talentflow.db".to_string(),
            database_max_connections: 5,
            latency_min_ms: 200,
            latency_max_ms: 1200,
            write_failure_rate: 0.1,
            fault_seed: None,
            passthrough_url: None,
            seed_on_start: true,
            seed_candidates: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            server_address: get_env_or("SERVER_ADDRESS", defaults.server_address),
            database_url: get_env_or("DATABASE_URL", defaults.database_url),
            database_max_connections: get_env_parse_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            latency_min_ms: get_env_parse_or("LATENCY_MIN_MS", defaults.latency_min_ms)?,
            latency_max_ms: get_env_parse_or("LATENCY_MAX_MS", defaults.latency_max_ms)?,
            write_failure_rate: get_env_parse_or(
                "WRITE_FAILURE_RATE",
                defaults.write_failure_rate,
            )?,
            fault_seed: get_env_parse_opt("FAULT_SEED")?,
            passthrough_url: env::var("PASSTHROUGH_URL").ok().filter(|v| !v.is_empty()),
            seed_on_start: get_env_parse_or("SEED_ON_START", defaults.seed_on_start)?,
            seed_candidates: get_env_parse_or("SEED_CANDIDATES", defaults.seed_candidates)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the latency and fault samplers cannot draw from.
    pub fn validate(&self) -> Result<()> {
        if self.latency_min_ms > self.latency_max_ms {
            return Err(Error::Config(format!(
                "LATENCY_MIN_MS ({}) must not exceed LATENCY_MAX_MS ({})",
                self.latency_min_ms, self.latency_max_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.write_failure_rate) {
            return Err(Error::Config(format!(
                "WRITE_FAILURE_RATE must be within [0, 1], got {}",
                self.write_failure_rate
            )));
        }
        if self.database_max_connections == 0 {
            return Err(Error::Config(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn get_env_or(name: &str, default: String) -> String {
    env::var(name).unwrap_or(default)
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parse_opt(name)?.unwrap_or(default))
}

fn get_env_parse_opt<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_mock_network_profile() {
        let config = Config::default();
        assert_eq!(config.latency_min_ms, 200);
        assert_eq!(config.latency_max_ms, 1200);
        assert!((config.write_failure_rate - 0.1).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_latency_window_is_rejected() {
        let config = Config {
            latency_min_ms: 500,
            latency_max_ms: 100,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn failure_rate_outside_unit_interval_is_rejected() {
        let config = Config {
            write_failure_rate: 1.5,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
