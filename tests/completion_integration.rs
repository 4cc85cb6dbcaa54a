/// Integration tests against a real OpenAI-compatible completion service.
///
/// These tests are skipped unless `OPENAI_API_KEY` is set. `OPENAI_BASE_URL`
/// and `OPENAI_MODEL` are honored as usual.
///
/// ```bash
/// OPENAI_API_KEY=sk-... cargo test --test completion_integration
/// ```
use std::sync::Arc;

use carenav::completion::{CompletionClientBuilder, CompletionClientTrait};
use carenav::sanitizer::sanitize;
use carenav::{QueryTranslator, Translation};

/// Skip test when no API key is configured
fn skip_without_key() -> bool {
    let _ = dotenvy::dotenv();
    if std::env::var("OPENAI_API_KEY").map_or(true, |k| k.trim().is_empty()) {
        println!("Skipping test (OPENAI_API_KEY not set)");
        return true;
    }
    false
}

fn translator() -> QueryTranslator {
    let client = CompletionClientBuilder::new()
        .build()
        .expect("Failed to create completion client");
    let model = client.model().to_string();
    QueryTranslator::new(Arc::new(client), model)
}

#[test]
fn raw_completion_returns_text() {
    if skip_without_key() {
        return;
    }

    let client = CompletionClientBuilder::new()
        .build()
        .expect("Failed to create completion client");
    let reply = client
        .complete(client.model(), "Reply with the single word: pong", "ping")
        .expect("completion failed");

    assert!(!reply.trim().is_empty());
}

#[test]
fn in_scope_question_translates_to_valid_select() {
    if skip_without_key() {
        return;
    }

    let translation = translator()
        .translate("Who is the cheapest for DRG 470 within 25 miles of 10001?")
        .expect("translation failed");

    let Translation::Candidate(sql) = &translation else {
        panic!("expected a candidate query, got {translation:?}");
    };
    let query = sanitize(sql).expect("model produced an invalid query");
    assert!(query.as_str().contains("470"), "{query}");
}

#[test]
fn out_of_scope_question_is_refused() {
    if skip_without_key() {
        return;
    }

    let translation = translator()
        .translate("What's the capital of France?")
        .expect("translation failed");

    assert!(translation.is_refusal(), "{translation:?}");
}
