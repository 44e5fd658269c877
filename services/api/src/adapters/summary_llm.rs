//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the task-summarizing LLM.
//! It implements the `SummarizationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateCompletionRequestArgs, Stop},
    Client,
};
use async_trait::async_trait;
use saily_core::ports::{PortError, PortResult, SummarizationService};
use saily_core::summary::{join_segments, render_prompt, GenerationParams};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` against an OpenAI-compatible
/// completions endpoint. The chat template is rendered locally so the raw prompt
/// matches what the instruct model expects.
#[derive(Clone)]
pub struct CompletionSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    params: GenerationParams,
}

impl CompletionSummaryAdapter {
    /// Creates a new `CompletionSummaryAdapter` with the fixed generation parameters.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self {
            client,
            model,
            params: GenerationParams::default(),
        }
    }
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for CompletionSummaryAdapter {
    async fn summarize_tasks(&self, tasks: &[String]) -> PortResult<String> {
        let request = CreateCompletionRequestArgs::default()
            .model(&self.model)
            .prompt(render_prompt(tasks))
            .max_tokens(u32::from(self.params.max_tokens))
            .temperature(self.params.temperature)
            .top_p(self.params.top_p)
            .presence_penalty(self.params.presence_penalty)
            .stop(Stop::StringArray(self.params.stop_sequences.clone()))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .completions()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        debug!(choices = response.choices.len(), "Summary model responded");

        // The model may answer in several segments; they form one summary.
        let summary = join_segments(response.choices.iter().map(|choice| choice.text.as_str()));
        if summary.is_empty() {
            return Err(PortError::Unexpected(
                "Summary LLM response contained no text content.".to_string(),
            ));
        }
        Ok(summary)
    }
}
