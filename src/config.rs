//! Configuration System
//!
//! Layered configuration for the provider, the generation pipeline, storage
//! and logging. Sources in increasing precedence: built-in defaults, the
//! global user file, workspace files, then `PLANWRIGHT__SECTION__KEY`
//! environment variables.

use crate::generation::{PlanStrategy, RetryPolicy, StrategyKind};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanwrightConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tier order, timeouts and retry behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Strategies in the order they are tried. Static for the process.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,

    /// Deadline for a single upstream call.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    #[serde(default)]
    pub retry: RetryPolicy,

    /// Per-strategy overrides of `retry`.
    #[serde(default)]
    pub strategy_retry: HashMap<StrategyKind, RetryPolicy>,

    /// How long a rate-limit signal suppresses upstream calls.
    #[serde(default = "default_circuit_ttl_secs")]
    pub circuit_ttl_secs: u64,
}

fn default_strategies() -> Vec<StrategyKind> {
    StrategyKind::DEFAULT_ORDER.to_vec()
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

fn default_circuit_ttl_secs() -> u64 {
    900
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            call_timeout_ms: default_call_timeout_ms(),
            retry: RetryPolicy::default(),
            strategy_retry: HashMap::new(),
            circuit_ttl_secs: default_circuit_ttl_secs(),
        }
    }
}

const MAX_RETRY_ATTEMPTS: u32 = 10;

impl PipelineConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn circuit_ttl(&self) -> Duration {
        Duration::from_secs(self.circuit_ttl_secs)
    }

    pub fn retry_for(&self, kind: StrategyKind) -> RetryPolicy {
        self.strategy_retry.get(&kind).copied().unwrap_or(self.retry)
    }

    /// Strategy objects in configured order.
    pub fn build_strategies(&self) -> Vec<Box<dyn PlanStrategy>> {
        self.strategies
            .iter()
            .map(|kind| kind.build(self.retry_for(*kind)))
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.call_timeout_ms == 0 {
            return Err("call_timeout_ms must be greater than zero".to_string());
        }
        if self.circuit_ttl_secs == 0 {
            return Err("circuit_ttl_secs must be greater than zero".to_string());
        }
        let mut seen = HashSet::new();
        for kind in &self.strategies {
            if !seen.insert(kind) {
                return Err(format!("Strategy '{}' is listed more than once", kind));
            }
        }
        let policies = std::iter::once((None, &self.retry))
            .chain(self.strategy_retry.iter().map(|(k, p)| (Some(*k), p)));
        for (kind, policy) in policies {
            if policy.max_attempts > MAX_RETRY_ATTEMPTS {
                return Err(format!(
                    "retry.max_attempts{} must be at most {}, got {}",
                    kind.map(|k| format!(" for '{}'", k)).unwrap_or_default(),
                    MAX_RETRY_ATTEMPTS,
                    policy.max_attempts
                ));
            }
        }
        Ok(())
    }
}

/// Where persisted state lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Circuit-breaker sled directory; relative paths resolve against the workspace.
    #[serde(default = "default_circuit_store_path")]
    pub circuit_store_path: PathBuf,
}

fn default_circuit_store_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "planwright")
        .map(|dirs| dirs.data_dir().join("circuit"))
        .unwrap_or_else(|| PathBuf::from(".planwright/circuit"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            circuit_store_path: default_circuit_store_path(),
        }
    }
}

impl StorageConfig {
    pub fn resolve_circuit_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.circuit_store_path.is_absolute() {
            self.circuit_store_path.clone()
        } else {
            workspace_root.join(&self.circuit_store_path)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.circuit_store_path.as_os_str().is_empty() {
            return Err("Circuit store path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Pipeline(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Pipeline(msg) => write!(f, "Pipeline: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PlanwrightConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.pipeline.validate() {
            errors.push(ValidationError::Pipeline(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
