//! Types for translation results.

/// Answer returned to the caller whenever a question is out of scope.
pub const REFUSAL_MESSAGE: &str = "I can only help with hospital pricing and quality information. Please ask about medical procedures, costs, or hospital ratings.";

/// Outcome of translating a question.
///
/// A translation is either a refusal or a candidate query, never both. The
/// candidate is raw model output and must still go through the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The question is not about procedure pricing, quality or providers.
    Refused {
        /// Model-supplied explanation, if any. Never shown to the caller.
        reason: Option<String>,
    },
    /// Model output to be cleaned and validated before execution.
    Candidate(String),
}

impl Translation {
    /// Returns true if the model declined the question.
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refused { .. })
    }

    /// Returns the candidate query text, if any.
    pub fn candidate(&self) -> Option<&str> {
        match self {
            Self::Candidate(sql) => Some(sql),
            Self::Refused { .. } => None,
        }
    }
}
