//! Query translation implementation using a chat-completion model.

use std::sync::Arc;

use crate::completion::{CompletionClientTrait, CompletionError};

use super::prompt::system_prompt;
use super::types::Translation;

/// Sentinel phrase older prompts and some models emit instead of JSON.
const LEGACY_REFUSAL_PHRASE: &str = "I can only help with";

/// Translates natural-language questions into candidate SQL.
pub struct QueryTranslator {
    client: Arc<dyn CompletionClientTrait>,
    model: String,
    system_prompt: String,
}

impl QueryTranslator {
    /// Creates a new `QueryTranslator` using `model` on the given client.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClientTrait>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            system_prompt: system_prompt(),
        }
    }

    /// Returns the model name sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Translates a question.
    ///
    /// # Errors
    ///
    /// Returns the completion error unchanged if the service call fails;
    /// no query should be executed in that case.
    pub fn translate(&self, question: &str) -> Result<Translation, CompletionError> {
        let response = self
            .client
            .complete(&self.model, &self.system_prompt, question)?;

        let translation = parse_translation(&response);
        match &translation {
            Translation::Refused { reason } => {
                tracing::info!(?reason, "Question refused as out of scope");
            }
            Translation::Candidate(sql) => {
                tracing::debug!(%sql, "Model produced candidate query");
            }
        }
        Ok(translation)
    }
}

/// Classifies raw model output.
///
/// Preference order: a JSON object with `refusal` or `sql`, then the legacy
/// refusal phrase, then the raw text as a candidate query.
fn parse_translation(response: &str) -> Translation {
    if let Some(translation) = extract_json(response).and_then(|json| parse_structured(&json)) {
        return translation;
    }

    if response.contains(LEGACY_REFUSAL_PHRASE) {
        return Translation::Refused { reason: None };
    }

    Translation::Candidate(response.trim().to_string())
}

fn parse_structured(json: &str) -> Option<Translation> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let obj = value.as_object()?;

    match obj.get("refusal") {
        Some(serde_json::Value::String(reason)) => {
            return Some(Translation::Refused {
                reason: Some(reason.clone()),
            });
        }
        Some(serde_json::Value::Bool(true)) => {
            return Some(Translation::Refused { reason: None });
        }
        _ => {}
    }

    obj.get("sql")
        .and_then(|v| v.as_str())
        .map(|sql| Translation::Candidate(sql.trim().to_string()))
}

/// Extracts the outermost `{...}` span from model output.
fn extract_json(response: &str) -> Option<String> {
    let trimmed = response.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;

    if start <= end {
        Some(trimmed[start..=end].to_string())
    } else {
        None
    }
}
