use moodlog_core::classifier::{ChatClassifier, ClassifierConfig};
use moodlog_core::ipc::{MoodCommand, MoodEvent};
use moodlog_core::router::handle_command;
use moodlog_core::{Journal, MoodStore, Sentiment};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn classifier_for(server: &MockServer) -> ChatClassifier {
    ChatClassifier::new(ClassifierConfig {
        api_key: "integration-key".to_string(),
        base_url: server.uri(),
        model: "test-model".to_string(),
        timeout_seconds: 5,
        max_retries: 1,
        retry_delay_ms: 10,
    })
    .expect("Failed to create classifier")
}

fn completion(content: &str) -> serde_json::Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

async fn mount_happy_service(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Reply with exactly one word"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("happy")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("supportive listener"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Love that for you.")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Return only a JSON object"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"message": "Keep it up", "activities": ["Cook something new", "Call a friend"]}"#,
        )))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_submit_then_analyze() {
    let server = MockServer::start().await;
    mount_happy_service(&server).await;
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(
        MoodStore::new(dir.path().join("mood_data.csv")),
        Some(Box::new(classifier_for(&server))),
    );

    let event = handle_command(
        MoodCommand::Submit {
            text: "Finished my first 10k, feeling amazing".to_string(),
        },
        &journal,
    )
    .await;

    match event {
        MoodEvent::ResultDisplay(submission) => {
            let c = submission.classification.expect("classification present");
            assert_eq!(c.sentiment, Sentiment::Happy);
            assert_eq!(c.supportive_message.as_deref(), Some("Love that for you."));
            assert_eq!(c.activity_suggestions.len(), 2);
            assert!(submission.notice.is_none());
        }
        other => panic!("Expected ResultDisplay, got {:?}", other),
    }

    match handle_command(MoodCommand::Analyze, &journal).await {
        MoodEvent::AnalysisDisplay(report) => {
            assert_eq!(report.total_records, 1);
            assert_eq!(report.happiest_day.count, 1);
            assert!(report.happiest_day.bucket.is_some());
            assert!(report.saddest_time.bucket.is_none());
        }
        other => panic!("Expected AnalysisDisplay, got {:?}", other),
    }
}

#[tokio::test]
async fn test_service_outage_still_saves_degraded_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "upstream exploded" }
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(
        MoodStore::new(dir.path().join("mood_data.csv")),
        Some(Box::new(classifier_for(&server))),
    );

    let event = handle_command(
        MoodCommand::Submit {
            text: "not sure, honestly".to_string(),
        },
        &journal,
    )
    .await;

    match event {
        MoodEvent::ResultDisplay(submission) => {
            assert!(submission.is_degraded());
            assert_eq!(submission.record.sentiment, Sentiment::Unknown);
            assert!(submission.notice.is_some());
        }
        other => panic!("Expected ResultDisplay, got {:?}", other),
    }

    let records = journal.store().load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sentiment, Sentiment::Unknown);
    assert_eq!(records[0].raw_text, "not sure, honestly");
}

#[tokio::test]
async fn test_informational_events() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(MoodStore::new(dir.path().join("mood_data.csv")), None);

    let analyze = handle_command(MoodCommand::Analyze, &journal).await;
    assert!(matches!(analyze, MoodEvent::Info { .. }), "got {:?}", analyze);

    let empty = handle_command(
        MoodCommand::Submit {
            text: "   ".to_string(),
        },
        &journal,
    )
    .await;
    assert!(matches!(empty, MoodEvent::Info { .. }), "got {:?}", empty);

    match handle_command(MoodCommand::History { limit: None }, &journal).await {
        MoodEvent::HistoryDisplay { records } => assert!(records.is_empty()),
        other => panic!("Expected HistoryDisplay, got {:?}", other),
    }
}

#[tokio::test]
async fn test_corrupt_log_is_error_event() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mood_data.csv");
    std::fs::write(&path, "Timestamp,Mood,Sentiment\n2024-13-45 99:00:00,x,happy\n").unwrap();
    let journal = Journal::new(MoodStore::new(&path), None);

    let event = handle_command(MoodCommand::Analyze, &journal).await;
    assert!(event.is_error(), "got {:?}", event);

    let event = handle_command(
        MoodCommand::Submit {
            text: "hello".to_string(),
        },
        &journal,
    )
    .await;
    assert!(event.is_error(), "got {:?}", event);
}
