//! Oracle client
//!
//! One call per batch: render the prompt, send it through the configured model
//! provider, validate the reply. No retries here; the pipeline owns retry
//! policy.

use crate::audit::{self, AuditEntry, AuditKind, AuditSink};
use crate::error::{ApiError, OracleError};
use crate::provider::{CompletionOptions, ModelProviderClient, ProviderConfig, ProviderFactory};
use crate::types::{Batch, BatchOutput, BusinessContext};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub mod prompt;
pub mod schema;

pub use schema::parse_batch_output;

/// Outcome of one oracle attempt.
pub type OracleResponse = Result<BatchOutput, OracleError>;

/// Per-run information handed to every oracle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    /// Tags audit entries so concurrent runs can be told apart.
    pub run_id: String,
    pub business: BusinessContext,
}

/// External generative service turning a batch of dates into content ideas.
#[async_trait]
pub trait ContentOracle: Send + Sync {
    async fn generate(&self, batch: &Batch, context: &GenerationContext) -> OracleResponse;
}

/// Oracle backed by an LLM chat completions endpoint.
pub struct LlmOracle {
    client: Box<dyn ModelProviderClient>,
    audit: Arc<dyn AuditSink>,
    options: CompletionOptions,
    timeout: Duration,
}

impl LlmOracle {
    pub fn new(
        client: Box<dyn ModelProviderClient>,
        audit: Arc<dyn AuditSink>,
        options: CompletionOptions,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            audit,
            options,
            timeout,
        }
    }

    pub fn from_config(config: &ProviderConfig, audit: Arc<dyn AuditSink>) -> Result<Self, ApiError> {
        let client = ProviderFactory::from_config(config)?;
        Ok(Self::new(
            client,
            audit,
            config.completion_options(),
            config.request_timeout(),
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    async fn call(&self, batch: &Batch, context: &GenerationContext) -> Result<String, OracleError> {
        let messages = prompt::build_messages(batch, &context.business);
        let prompt_text = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        audit::record(
            self.audit.as_ref(),
            AuditEntry::new(&context.run_id, batch, AuditKind::Prompt, prompt_text),
        )
        .await;

        let completion = tokio::time::timeout(
            self.timeout,
            self.client.complete(messages, self.options.clone()),
        )
        .await
        .map_err(|_| OracleError::Timeout(self.timeout))??;

        debug!(
            run_id = %context.run_id,
            model = %completion.model,
            total_tokens = completion.usage.total_tokens,
            finish_reason = ?completion.finish_reason,
            "Oracle completion received"
        );
        Ok(completion.content)
    }
}

#[async_trait]
impl ContentOracle for LlmOracle {
    async fn generate(&self, batch: &Batch, context: &GenerationContext) -> OracleResponse {
        let started = Instant::now();
        let result = match self.call(batch, context).await {
            Ok(content) => {
                audit::record(
                    self.audit.as_ref(),
                    AuditEntry::new(&context.run_id, batch, AuditKind::Response, content.clone()),
                )
                .await;
                parse_batch_output(&content, batch)
            }
            Err(e) => {
                audit::record(
                    self.audit.as_ref(),
                    AuditEntry::new(&context.run_id, batch, AuditKind::Error, e.to_string()),
                )
                .await;
                Err(e)
            }
        };

        if let Err(ref e) = result {
            warn!(
                run_id = %context.run_id,
                dates = %batch.span(),
                batch_size = batch.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "Oracle attempt failed"
            );
        } else {
            debug!(
                run_id = %context.run_id,
                dates = %batch.span(),
                batch_size = batch.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Oracle attempt succeeded"
            );
        }
        result
    }
}
