//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{CircuitCommands, Commands, PreferenceArgs};
use crate::cli::presentation::{
    format_circuit_status_json, format_circuit_status_text, format_outcome_json,
    format_outcome_text, format_plan_json, format_plan_text, use_color,
};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigLoader, PlanwrightConfig};
use crate::error::ApiError;
use crate::generation::{
    build_fallback, repair, validate_plan, CircuitBreaker, Difficulty, FallbackReason,
    FallbackResult, GenerationRequest, PlanOrchestrator, PlanOutcome, PlanSchema,
};
use crate::provider::ProviderFactory;
use crate::store::{MemoryKeyValueStore, SledKeyValueStore};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(raw: &str) -> Result<Self, ApiError> {
        match raw {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Unknown output format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Runtime context for CLI execution: workspace, loaded configuration and clock.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PlanwrightConfig,
    clock: Arc<dyn Clock>,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::with_config(workspace_root, config, Arc::new(SystemClock))
    }

    /// Context over an already-loaded configuration.
    pub fn with_config(
        workspace_root: PathBuf,
        config: PlanwrightConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!("Invalid configuration: {}", details.join("; ")))
        })?;
        Ok(Self {
            workspace_root,
            config,
            clock,
        })
    }

    pub fn config(&self) -> &PlanwrightConfig {
        &self.config
    }

    /// Open the persisted circuit. Opened per command so read-only commands never lock the store.
    pub fn open_circuit(&self) -> Result<Arc<CircuitBreaker>, ApiError> {
        let path = self
            .config
            .storage
            .resolve_circuit_store_path(&self.workspace_root);
        std::fs::create_dir_all(&path)?;
        let store = SledKeyValueStore::with_clock(&path, Arc::clone(&self.clock))?;
        Ok(Arc::new(CircuitBreaker::new(
            Arc::new(store),
            Arc::clone(&self.clock),
            self.config.pipeline.circuit_ttl(),
        )))
    }

    /// Persisted circuit, or a process-local one when the store is unavailable
    /// (typically locked by a concurrent run). Generation never fails on it.
    fn circuit_for_generate(&self) -> Arc<CircuitBreaker> {
        match self.open_circuit() {
            Ok(circuit) => circuit,
            Err(e) => {
                warn!(error = %e, "Circuit store unavailable, using in-memory circuit for this run");
                let store = MemoryKeyValueStore::with_clock(Arc::clone(&self.clock));
                Arc::new(CircuitBreaker::new(
                    Arc::new(store),
                    Arc::clone(&self.clock),
                    self.config.pipeline.circuit_ttl(),
                ))
            }
        }
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        let result = self.execute_inner(command);
        info!(
            command = name,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                preferences,
                format,
            } => self.handle_generate(preferences, OutputFormat::parse(format)?),
            Commands::Fallback {
                preferences,
                format,
            } => {
                let plan = build_fallback(&preferences.to_request());
                match OutputFormat::parse(format)? {
                    OutputFormat::Json => format_plan_json(&plan),
                    OutputFormat::Text => Ok(format_plan_text(&plan, use_color())),
                }
            }
            Commands::Repair { file } => {
                let text = read_input(file.as_deref())?;
                let document = repair(&text)?;
                Ok(serde_json::to_string_pretty(&document)?)
            }
            Commands::Validate {
                file,
                frequency,
                difficulty,
                format,
            } => {
                let format = OutputFormat::parse(format)?;
                let request =
                    GenerationRequest::new(*frequency, Difficulty::parse_lenient(difficulty));
                let document = repair(&read_input(Some(file.as_path()))?)?;
                let plan = validate_plan(&document, &PlanSchema::for_request(&request))
                    .map_err(ApiError::InvalidPlan)?;
                match format {
                    OutputFormat::Json => format_plan_json(&plan),
                    OutputFormat::Text => Ok(format_plan_text(&plan, use_color())),
                }
            }
            Commands::Circuit { command } => self.handle_circuit_command(command),
        }
    }

    fn handle_generate(
        &self,
        preferences: &PreferenceArgs,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let request = preferences.to_request();
        let outcome = match ProviderFactory::from_config(&self.config.provider) {
            Ok(provider) => {
                let orchestrator = PlanOrchestrator::from_config(
                    &self.config.pipeline,
                    Arc::from(provider),
                    self.circuit_for_generate(),
                    self.config.provider.default_options.clone(),
                );
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(orchestrator.generate(&request))
            }
            Err(e) => {
                warn!(error = %e, "Provider unavailable, using template plan");
                PlanOutcome::Fallback(FallbackResult::new(
                    build_fallback(&request),
                    FallbackReason::NoStrategies,
                ))
            }
        };

        match format {
            OutputFormat::Json => format_outcome_json(&outcome),
            OutputFormat::Text => Ok(format_outcome_text(&outcome, use_color())),
        }
    }

    fn handle_circuit_command(&self, command: &CircuitCommands) -> Result<String, ApiError> {
        let circuit = self.open_circuit()?;
        match command {
            CircuitCommands::Status { format } => {
                let state = circuit.state()?;
                let now = self.clock.now();
                match OutputFormat::parse(format)? {
                    OutputFormat::Json => format_circuit_status_json(state.as_ref(), now),
                    OutputFormat::Text => Ok(format_circuit_status_text(state.as_ref(), now)),
                }
            }
            CircuitCommands::Clear => {
                circuit.clear()?;
                Ok("Circuit cleared.".to_string())
            }
        }
    }
}

/// File contents, or all of stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, ApiError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
