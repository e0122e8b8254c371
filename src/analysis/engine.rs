//! Analysis engine: model invocation, output validation and usage accounting.
//!
//! One invocation is one unit of work with no state carried across calls:
//! build the prompt, call the model with JSON-only output enforced, validate
//! the reply against the output schema, then measure token usage and derive
//! cost. A failed attempt is terminal for that request - the engine never
//! retries, whether the failure is transport-level or an invalid reply.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use super::context::AnalysisInput;
use super::output::{parse_output, AnalysisOutput, OutputError};
use super::prompt::build_prompt;
use crate::config::GeminiConfig;

/// Fixed persona constraint sent with every generation request
pub const SYSTEM_INSTRUCTION: &str =
    "You are an analyst specialized in digital marketing and sales funnels. Reply ONLY with valid JSON, no additional text.";

/// One generation request to the model endpoint
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Failures from the model endpoint itself (not from its reply content)
#[derive(Debug, Error)]
pub enum ModelError {
    /// The call could not complete: connection failure, timeout, bad response body
    #[error("model call failed: {message}")]
    Transport { message: String },

    /// The endpoint answered with a non-success status
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Abstract generative model endpoint.
///
/// One synchronous text-generation call plus a companion token-counting
/// operation. Token counts for prompt and reply are measured separately after
/// generation rather than trusted from the generation response.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a reply for the request. The reply must be raw JSON text with
    /// no surrounding prose (the endpoint is configured for JSON-only output).
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;

    /// Count tokens for an arbitrary piece of text
    async fn count_tokens(&self, text: &str) -> Result<i64, ModelError>;
}

/// Token counts and derived cost for one model invocation, never mutated
/// after creation
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
    pub estimated_cost: Decimal,
}

impl UsageRecord {
    pub fn new(prompt_tokens: i64, completion_tokens: i64, config: &GeminiConfig) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            estimated_cost: estimated_cost(
                prompt_tokens,
                completion_tokens,
                config.input_cost_per_million,
                config.output_cost_per_million,
            ),
        }
    }
}

/// Pure cost arithmetic: per-million-token rates applied to each side of the
/// call. No rounding here - formatting happens at presentation time.
pub fn estimated_cost(prompt_tokens: i64, completion_tokens: i64, input_rate: Decimal, output_rate: Decimal) -> Decimal {
    const MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
    Decimal::from(prompt_tokens) / MILLION * input_rate + Decimal::from(completion_tokens) / MILLION * output_rate
}

/// A schema-valid analysis together with its usage accounting
#[derive(Debug, Clone)]
pub struct GeneratedAnalysis {
    pub output: AnalysisOutput,
    pub usage: UsageRecord,
}

/// Failures of one analysis attempt
#[derive(Debug, Error)]
pub enum EngineError {
    /// The reply was empty, malformed or schema-violating
    #[error(transparent)]
    InvalidOutput(#[from] OutputError),

    /// The model call itself failed; propagated unchanged, never swallowed
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Sends analysis prompts to the generative model and validates the replies
#[derive(Clone)]
pub struct AnalysisEngine {
    model: Arc<dyn GenerativeModel>,
    config: GeminiConfig,
}

impl AnalysisEngine {
    pub fn new(model: Arc<dyn GenerativeModel>, config: GeminiConfig) -> Self {
        Self { model, config }
    }

    /// Identifier of the model in use, recorded on every persisted report
    pub fn model_id(&self) -> &str {
        &self.config.model
    }

    /// Runs one full analysis: prompt, generation, validation, usage.
    ///
    /// Either the whole reply validates and a [`GeneratedAnalysis`] is
    /// returned, or the attempt fails - no partial result ever escapes.
    #[instrument(skip_all, err)]
    pub async fn analyze(&self, input: &AnalysisInput) -> Result<GeneratedAnalysis, EngineError> {
        let prompt = build_prompt(input);
        debug!(prompt_chars = prompt.len(), "sending analysis prompt to model");

        let request = GenerationRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt.clone(),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };

        let reply = self.model.generate(&request).await?;
        let output = parse_output(&reply)?;

        // Two separate measurements; the generation response's own counts are
        // deliberately not trusted
        let prompt_tokens = self.model.count_tokens(&prompt).await?;
        let completion_tokens = self.model.count_tokens(&reply).await?;
        let usage = UsageRecord::new(prompt_tokens, completion_tokens, &self.config);

        debug!(total_tokens = usage.total_tokens, "analysis completed");

        Ok(GeneratedAnalysis { output, usage })
    }
}

#[cfg(test)]
pub(crate) mod test_model {
    use super::*;
    use std::sync::Mutex;

    /// Scripted model for tests: returns a fixed reply (or transport error)
    /// and counts tokens as whitespace-separated words.
    pub struct ScriptedModel {
        pub reply: Result<String, String>,
        pub requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedModel {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(message) => Err(ModelError::Transport {
                    message: message.clone(),
                }),
            }
        }

        async fn count_tokens(&self, text: &str) -> Result<i64, ModelError> {
            Ok(text.split_whitespace().count() as i64)
        }
    }
}
