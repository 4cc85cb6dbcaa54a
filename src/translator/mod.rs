//! Natural-language to SQL translation using a chat-completion model.
//!
//! The `QueryTranslator` sends the question together with a fixed schema
//! description and rule set, and classifies the reply as either a scope
//! refusal or a candidate query for the sanitizer.

mod prompt;
mod query_translator;
mod types;

pub use prompt::{PROCEDURE_ALIASES, system_prompt};
pub use query_translator::QueryTranslator;
pub use types::{REFUSAL_MESSAGE, Translation};
