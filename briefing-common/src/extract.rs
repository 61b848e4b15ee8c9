//! Briefing extraction
//!
//! Turns a conversation into a validated [`BriefingRecord`]:
//! prompt → completion call → JSON payload location → parse → schema check.
//!
//! The completion reply is untrusted text. The payload is taken as the span
//! from the first `{` to the last `}` so that commentary the model adds around
//! the object is ignored. No retry happens here; callers decide whether to
//! re-invoke.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::briefing::{BriefingRecord, SchemaViolation};
use crate::completion::{ChatMessage, CompletionClient, CompletionError, CompletionRequest};
use crate::config::{CompletionSettings, MissingFieldPolicy};
use crate::prompt::build_prompt;

/// Extraction failure
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Reply holds no parseable JSON object
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Reply parsed but does not match the briefing schema
    #[error("Briefing schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaViolation),

    /// Completion call exceeded its time bound
    #[error("Completion call timed out after {0:?}")]
    UpstreamTimeout(Duration),

    /// Completion endpoint failed (network, auth, HTTP status)
    #[error("Completion call failed: {0}")]
    UpstreamFailed(String),
}

impl ExtractionError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::MalformedResponse(_) => "malformed-response",
            ExtractionError::SchemaMismatch(_) => "schema-mismatch",
            ExtractionError::UpstreamTimeout(_) => "upstream-timeout",
            ExtractionError::UpstreamFailed(_) => "upstream-failed",
        }
    }
}

/// Settings an [`Extractor`] runs with
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub missing_field_policy: MissingFieldPolicy,
}

impl ExtractorSettings {
    pub fn from_config(completion: &CompletionSettings, policy: MissingFieldPolicy) -> Self {
        Self {
            model: completion.model.clone(),
            temperature: completion.temperature,
            max_tokens: completion.max_tokens,
            timeout: completion.timeout(),
            missing_field_policy: policy,
        }
    }
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self::from_config(&CompletionSettings::default(), MissingFieldPolicy::default())
    }
}

/// Locate the candidate JSON payload inside a completion reply
///
/// Returns the slice from the first `{` through the last `}`.
pub fn locate_json_payload(reply: &str) -> Result<&str, ExtractionError> {
    let start = reply.find('{').ok_or_else(|| {
        ExtractionError::MalformedResponse("no '{' found in model response".to_string())
    })?;

    match reply.rfind('}') {
        Some(end) if end > start => Ok(&reply[start..=end]),
        _ => Err(ExtractionError::MalformedResponse(
            "no closing '}' found after '{' in model response".to_string(),
        )),
    }
}

/// Parse and validate a completion reply into a briefing
pub fn parse_briefing_reply(reply: &str) -> Result<BriefingRecord, ExtractionError> {
    let payload = locate_json_payload(reply)?;

    let value: Value = serde_json::from_str(payload).map_err(|e| {
        ExtractionError::MalformedResponse(format!("invalid JSON in model response: {}", e))
    })?;

    Ok(BriefingRecord::from_value(value)?)
}

/// Builds prompts, calls the completion client and validates replies
#[derive(Clone)]
pub struct Extractor {
    client: Arc<dyn CompletionClient>,
    settings: ExtractorSettings,
}

impl Extractor {
    pub fn new(client: Arc<dyn CompletionClient>, settings: ExtractorSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Completion request for a conversation
    pub fn build_request(&self, conversation: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(
                conversation,
                self.settings.missing_field_policy,
            ))],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            stream: false,
        }
    }

    /// Extract a briefing from conversation text
    pub async fn extract(&self, conversation: &str) -> Result<BriefingRecord, ExtractionError> {
        let request = self.build_request(conversation);
        let timeout = self.settings.timeout;

        debug!(
            model = %request.model,
            conversation_len = conversation.len(),
            "Requesting briefing completion"
        );

        let reply = match tokio::time::timeout(timeout, self.client.complete(&request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(CompletionError::Timeout)) | Err(_) => {
                warn!(?timeout, "Completion call timed out");
                return Err(ExtractionError::UpstreamTimeout(timeout));
            }
            Ok(Err(CompletionError::EmptyResponse)) => {
                return Err(ExtractionError::MalformedResponse(
                    "completion returned no choices".to_string(),
                ));
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Completion call failed");
                return Err(ExtractionError::UpstreamFailed(e.to_string()));
            }
        };

        match parse_briefing_reply(&reply) {
            Ok(record) => {
                info!(reply_len = reply.len(), "Briefing extracted");
                Ok(record)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, reply_len = reply.len(), "Briefing extraction failed");
                Err(e)
            }
        }
    }
}
