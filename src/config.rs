//! Configuration structs.
//!
//! Both structs are plain serde data with sensible defaults, so they can be
//! embedded in a caller's own config file.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;

/// Default `RUST_LOG`-style directive when none is set.
pub const DEFAULT_LOG_FILTER: &str = "dag_kernel=info";

/// Scheduler tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum vertices handed out by one `start_batch` call. `None` hands
    /// out everything that is ready.
    pub batch_limit: Option<usize>,
}

impl SchedulerConfig {
    /// Config with a fixed batch limit.
    pub fn with_batch_limit(limit: usize) -> Self {
        Self {
            batch_limit: Some(limit),
        }
    }

    /// Stable hash of these parameters, for tagging run records.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { batch_limit: None }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable multi-line output for local development.
    Pretty,
}

impl LogFormat {
    /// Parse a format name. Anything other than `pretty` means JSON.
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("pretty") {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Json
    }
}

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive string.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl TelemetryConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok().as_deref(),
            std::env::var("LOG_FORMAT").ok().as_deref(),
        )
    }

    fn from_vars(filter: Option<&str>, format: Option<&str>) -> Self {
        Self {
            filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(DEFAULT_LOG_FILTER)
                .to_string(),
            format: format.map(LogFormat::parse).unwrap_or_default(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::Json,
        }
    }
}
