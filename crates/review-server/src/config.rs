//! Server configuration from environment variables.

use std::env;
use std::time::Duration;

use review_engine::{AnalysisOptions, EngineConfig};

#[derive(Clone, Debug)]
pub struct Config {
    pub engine: EngineConfig,
    pub options: AnalysisOptions,
    /// Number of engine sessions to keep alive.
    pub pool_size: usize,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let engine = EngineConfig {
            path: env::var("STOCKFISH_PATH")
                .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string()),
            eval_timeout: Duration::from_secs(env_parse("EVAL_TIMEOUT_SECS", 20)),
            resync_timeout: Duration::from_secs(env_parse("RESYNC_TIMEOUT_SECS", 5)),
            ..EngineConfig::default()
        };

        let options = AnalysisOptions {
            depth: env_parse("ANALYSIS_DEPTH", 15),
            opening_cutoff: env_parse("OPENING_CUTOFF", 0),
            max_consecutive_timeouts: env_parse("MAX_CONSECUTIVE_TIMEOUTS", 3),
        };

        Self {
            engine,
            options,
            pool_size: env_parse("ENGINE_POOL_SIZE", num_cpus::get()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT", 8000),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
