//! Generation Client
//!
//! Issues one logical request to the upstream model: shapes the messages,
//! races each attempt against the call timeout, retries transient transport
//! failures per [`RetryPolicy`] and trips the circuit on rate limiting.

use crate::error::{GenerationError, ProviderError};
use crate::generation::circuit::CircuitBreaker;
use crate::generation::retry::RetryPolicy;
use crate::provider::{ChatMessage, CompletionOptions, FunctionSpec, ModelProviderClient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Outbound request: a prompt or a structured function call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelCall {
    Prompt {
        system: String,
        user: String,
        options: CompletionOptions,
    },
    FunctionCall {
        system: String,
        user: String,
        function: FunctionSpec,
        options: CompletionOptions,
    },
}

impl ModelCall {
    fn to_request(&self) -> (Vec<ChatMessage>, CompletionOptions) {
        match self {
            ModelCall::Prompt {
                system,
                user,
                options,
            } => (
                vec![ChatMessage::system(system), ChatMessage::user(user)],
                CompletionOptions {
                    function: None,
                    ..options.clone()
                },
            ),
            ModelCall::FunctionCall {
                system,
                user,
                function,
                options,
            } => (
                vec![ChatMessage::system(system), ChatMessage::user(user)],
                CompletionOptions {
                    function: Some(function.clone()),
                    ..options.clone()
                },
            ),
        }
    }

    fn is_function_call(&self) -> bool {
        matches!(self, ModelCall::FunctionCall { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    Text,
    FunctionArguments,
}

/// Untrusted upstream output, fed to text repair regardless of shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelOutput {
    pub text: String,
    pub shape: OutputShape,
}

pub struct GenerationClient {
    provider: Arc<dyn ModelProviderClient>,
    circuit: Arc<CircuitBreaker>,
    call_timeout: Duration,
    default_options: CompletionOptions,
    invocations: AtomicUsize,
}

impl GenerationClient {
    pub fn new(
        provider: Arc<dyn ModelProviderClient>,
        circuit: Arc<CircuitBreaker>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            circuit,
            call_timeout,
            default_options: CompletionOptions::default(),
            invocations: AtomicUsize::new(0),
        }
    }

    /// Base sampling options strategies start from.
    pub fn with_default_options(mut self, options: CompletionOptions) -> Self {
        self.default_options = CompletionOptions {
            function: None,
            ..options
        };
        self
    }

    pub fn default_options(&self) -> &CompletionOptions {
        &self.default_options
    }

    /// Provider calls started so far, retries included.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn circuit(&self) -> &CircuitBreaker {
        &self.circuit
    }

    pub async fn request(
        &self,
        call: &ModelCall,
        policy: &RetryPolicy,
    ) -> Result<RawModelOutput, GenerationError> {
        let mut attempt = 1;
        loop {
            let err = match self.attempt(call).await {
                Ok(output) => return Ok(output),
                Err(err) => err,
            };

            match &err {
                GenerationError::RateLimit(message) => {
                    warn!(
                        provider = self.provider.provider_name(),
                        message = %message,
                        "Upstream rate limit detected"
                    );
                    if let Err(store_err) = self.circuit.trip(self.circuit.default_ttl()) {
                        error!(error = %store_err, "Failed to persist circuit trip");
                    }
                    return Err(err);
                }
                GenerationError::Transport(provider_err)
                    if provider_err.is_transient() && policy.allows_retry_after(attempt) =>
                {
                    warn!(
                        attempt,
                        max_attempts = policy.attempts(),
                        error = %provider_err,
                        "Transient upstream failure, retrying"
                    );
                    tokio::time::sleep(policy.delay()).await;
                    attempt += 1;
                }
                _ => return Err(err),
            }
        }
    }

    async fn attempt(&self, call: &ModelCall) -> Result<RawModelOutput, GenerationError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let (messages, options) = call.to_request();

        let response =
            match tokio::time::timeout(self.call_timeout, self.provider.complete(messages, options))
                .await
            {
                Err(_) => return Err(GenerationError::Timeout(self.call_timeout)),
                Ok(Err(ProviderError::Timeout(_))) => {
                    return Err(GenerationError::Timeout(self.call_timeout))
                }
                Ok(Err(err)) => return Err(err.into()),
                Ok(Ok(response)) => response,
            };

        debug!(
            provider = self.provider.provider_name(),
            model = %response.model,
            completion_tokens = response.usage.completion_tokens,
            "Upstream call completed"
        );

        match response.function_arguments {
            Some(arguments) if call.is_function_call() && !arguments.trim().is_empty() => {
                Ok(RawModelOutput {
                    text: arguments,
                    shape: OutputShape::FunctionArguments,
                })
            }
            _ => Ok(RawModelOutput {
                text: response.content,
                shape: OutputShape::Text,
            }),
        }
    }
}
