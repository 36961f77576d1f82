// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete SAVA pipeline.
//!
//! Each test builds an isolated stack on a temp SQLite database. Tests are
//! independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use sava_config::SavaConfig;
use sava_core::types::SATURATED_EXPLANATION;
use sava_core::{ProviderErrorKind, ResultStore, Sentiment};
use sava_dispatch::BatchDispatcher;
use sava_gemini::GeminiProvider;
use sava_gemini::client::GeminiClient;
use sava_router::ProviderRouter;
use sava_storage::SqliteResultStore;
use sava_test_utils::{MockOutcome, TestHarness};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEMS: [&str; 3] = [
    "Investment boosts exports",
    "Severe drought destroys crops",
    "Quarterly report published",
];

const REPLY: &str = "1|Positivo|inversión\n2|Negativo|sequía\n3|Neutro|informe";

// ---- Harness pipeline ----

#[tokio::test]
async fn batch_is_classified_then_served_from_cache() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![REPLY.to_string()])
        .build()
        .await
        .unwrap();

    let first = harness.classify(&ITEMS).await.unwrap();
    let labels: Vec<_> = first.iter().map(|r| r.label).collect();
    assert_eq!(
        labels,
        vec![Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
    );
    assert_eq!(first[1].explanation, "sequía");

    let second = harness.classify(&ITEMS).await.unwrap();
    assert_eq!(harness.mock_provider.call_count().await, 1);
    assert!(second.iter().all(|r| r.from_cache));
    assert_eq!(
        second.iter().map(|r| r.label).collect::<Vec<_>>(),
        labels
    );
}

#[tokio::test]
async fn cache_stats_reflect_hits() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![REPLY.to_string()])
        .build()
        .await
        .unwrap();

    harness.classify(&ITEMS).await.unwrap();
    harness.classify(&ITEMS).await.unwrap();

    let stats = harness.store.stats().await.unwrap();
    assert_eq!(stats.total_entries, 3);
    assert_eq!(stats.total_hits, 6);
    assert!((stats.hit_rate - 0.5).abs() < 1e-9);
    assert_eq!(stats.distribution.get(&Sentiment::Negative), Some(&1));
}

#[tokio::test]
async fn expired_entries_are_reclassified_and_swept() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["1|Positivo|nueva inversión".to_string()])
        .build()
        .await
        .unwrap();
    harness
        .store
        .put_at(
            ITEMS[0],
            Sentiment::Negative,
            "stale",
            Utc::now() - ChronoDuration::days(45),
        )
        .await
        .unwrap();

    let records = harness.classify(&ITEMS[..1]).await.unwrap();
    assert_eq!(records[0].label, Sentiment::Positive);
    assert!(!records[0].from_cache);
    assert_eq!(harness.mock_provider.call_count().await, 1);

    assert_eq!(harness.store.sweep(0).await.unwrap(), 1);
    assert_eq!(harness.store.stats().await.unwrap().total_entries, 0);
}

#[tokio::test(start_paused = true)]
async fn dead_endpoint_is_dropped_for_later_batches() {
    let harness = TestHarness::builder()
        .with_endpoints(&["gone", "alive"])
        .with_script("gone", vec![MockOutcome::Fail(ProviderErrorKind::EndpointNotFound)])
        .with_default(MockOutcome::reply("1|Neutro|ok"))
        .build()
        .await
        .unwrap();

    harness.classify(&["first headline"]).await.unwrap();
    harness.classify(&["second headline"]).await.unwrap();

    assert_eq!(harness.router.endpoints().await, vec!["alive"]);
    assert_eq!(
        harness.mock_provider.endpoints_called().await,
        vec!["gone", "alive", "alive"]
    );
}

#[tokio::test(start_paused = true)]
async fn saturated_batch_is_retried_on_next_call() {
    let harness = TestHarness::builder()
        .with_endpoints(&["only"])
        .with_script(
            "only",
            vec![
                MockOutcome::Fail(ProviderErrorKind::QuotaExceeded),
                MockOutcome::reply("1|Negativo|plaga"),
            ],
        )
        .with_cooldown(Duration::from_millis(2000))
        .build()
        .await
        .unwrap();

    let first = harness.classify(&["Plaga de roya"]).await.unwrap();
    assert_eq!(first[0].explanation, SATURATED_EXPLANATION);

    let second = harness.classify(&["Plaga de roya"]).await.unwrap();
    assert_eq!(second[0].label, Sentiment::Negative);
    assert!(!second[0].from_cache);
}

// ---- Real Gemini adapter against a mock server ----

async fn gemini_stack(
    server: &MockServer,
    dir: &tempfile::TempDir,
) -> (Arc<SqliteResultStore>, BatchDispatcher) {
    let mut config = SavaConfig::default();
    config.storage.database_path = dir.path().join("e2e.db").to_string_lossy().to_string();
    config.gemini.models = vec!["gemini-retired".to_string(), "gemini-2.0-flash".to_string()];
    config.router.cooldown_ms = 0;

    let store = Arc::new(SqliteResultStore::new(config.storage.clone()));
    store.initialize().await.unwrap();

    let client = GeminiClient::new("test-key", &server.uri(), Duration::from_secs(5)).unwrap();
    let provider = Arc::new(GeminiProvider::with_client(client));
    let router = Arc::new(ProviderRouter::from_config(provider, &config));
    let dispatcher = BatchDispatcher::from_config(store.clone(), router, &config);
    (store, dispatcher)
}

#[tokio::test]
async fn gemini_adapter_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-retired:generateContent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "model not found", "status": "NOT_FOUND"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": REPLY}]}, "finishReason": "STOP"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, dispatcher) = gemini_stack(&server, &dir).await;
    let items: Vec<String> = ITEMS.iter().map(|s| (*s).to_string()).collect();

    let first = dispatcher.classify(&items).await.unwrap();
    assert_eq!(first[0].label, Sentiment::Positive);
    assert_eq!(first[2].label, Sentiment::Neutral);

    let second = dispatcher.classify(&items).await.unwrap();
    assert!(second.iter().all(|r| r.from_cache));
    assert_eq!(store.stats().await.unwrap().total_entries, 3);
}

#[tokio::test]
async fn gemini_safety_block_falls_through_to_saturation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (store, dispatcher) = gemini_stack(&server, &dir).await;

    let records = dispatcher
        .classify(&["Paro armado bloquea vías".to_string()])
        .await
        .unwrap();
    assert_eq!(records[0].explanation, SATURATED_EXPLANATION);
    assert_eq!(store.stats().await.unwrap().total_entries, 0);
}
