//! End-to-end turns: controller, session and HTML renderer together.

use devchat::core::action::{Action, Effect, update};
use devchat::core::state::{App, GREETING, INIT_FAILURE_MESSAGE};
use devchat::core::transcript::{Message, Role};
use devchat::inference::{ChatSession, SessionConfig, SessionError, StreamChunk, create_session};
use devchat::render;
use tokio::sync::mpsc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn sse_response(fragments: &[&str]) -> ResponseTemplate {
    let body: String = fragments
        .iter()
        .map(|f| {
            format!(
                "data: {{\"candidates\":[{{\"content\":{{\"role\":\"model\",\"parts\":[{{\"text\":\"{f}\"}}]}}}}]}}\n\n"
            )
        })
        .collect();
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

async fn app_against(server: &MockServer) -> App {
    let config = SessionConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        ..SessionConfig::default()
    };
    App::new(create_session(&config), config.model)
}

/// Plays one turn the way the event loop does: submit, stream every fragment
/// through `update`, then report completion or failure.
async fn play_turn(app: &mut App, text: &str) -> Vec<Vec<Message>> {
    let mut snapshots = Vec::new();
    let Effect::SpawnRequest(message) = update(app, Action::Submit(text.to_string())) else {
        return snapshots;
    };
    let Some(session) = app.session.clone() else {
        return snapshots;
    };

    let (tx, mut rx) = mpsc::channel::<StreamChunk>(100);
    let outcome = session.send_message_stream(&message, tx).await;
    while let Some(chunk) = rx.recv().await {
        update(app, Action::ResponseChunk(chunk.text));
        snapshots.push(app.transcript.messages().to_vec());
    }
    match outcome {
        Ok(()) => update(app, Action::ResponseDone),
        Err(e) => update(app, Action::ResponseFailed(e.to_string())),
    };
    snapshots
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_greeting_then_streamed_reply() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:streamGenerateContent"))
        .respond_with(sse_response(&["Hi", " there"]))
        .mount(&mock_server)
        .await;

    let mut app = app_against(&mock_server).await;
    assert_eq!(app.transcript.messages(), &[Message::model(GREETING)]);

    let snapshots = play_turn(&mut app, "hello").await;

    // The placeholder always holds the concatenation of fragments so far.
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0][2], Message::model("Hi"));
    assert_eq!(snapshots[1][2], Message::model("Hi there"));

    let messages = app.transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], Message::user("hello"));
    assert_eq!(messages[2], Message::model("Hi there"));
    assert!(!app.is_loading);
    assert_eq!(app.status_message, "Ready");
}

#[tokio::test]
async fn test_multibyte_fragments_fill_placeholder_exactly() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse_response(&["Voilà: ", "データ ", "✅"]))
        .mount(&mock_server)
        .await;

    let mut app = app_against(&mock_server).await;
    let snapshots = play_turn(&mut app, "résumé?").await;

    let placeholder: Vec<&str> = snapshots.iter().map(|s| s[2].content.as_str()).collect();
    assert_eq!(placeholder, vec!["Voilà: ", "Voilà: データ ", "Voilà: データ ✅"]);
    assert_eq!(app.transcript.messages()[1], Message::user("résumé?"));
    assert_eq!(app.transcript.last(), Some(&Message::model("Voilà: データ ✅")));
}

#[tokio::test]
async fn test_api_failure_replaces_placeholder_with_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string(
            r#"{"error":{"code":429,"message":"Resource has been exhausted"}}"#,
        ))
        .mount(&mock_server)
        .await;

    let mut app = app_against(&mock_server).await;
    play_turn(&mut app, "hello").await;

    let messages = app.transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], Message::model(GREETING));
    assert_eq!(messages[1], Message::user("hello"));
    assert_eq!(
        messages[2],
        Message::error("API error (HTTP 429): Resource has been exhausted")
    );
    assert!(!app.is_loading);
}

#[tokio::test]
async fn test_turns_after_failure_still_work() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(sse_response(&["Recovered"]))
        .mount(&mock_server)
        .await;

    let mut app = app_against(&mock_server).await;
    play_turn(&mut app, "first").await;
    play_turn(&mut app, "second").await;

    let roles: Vec<Role> = app.transcript.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::Model, Role::User, Role::Error, Role::User, Role::Model]
    );
    assert_eq!(app.transcript.last(), Some(&Message::model("Recovered")));
}

#[test]
fn test_missing_api_key_opens_read_only() {
    let app = App::new(
        create_session(&SessionConfig::default()),
        "gemini-2.5-flash".to_string(),
    );

    assert_eq!(app.transcript.len(), 1);
    assert_eq!(app.transcript.messages()[0], Message::error(INIT_FAILURE_MESSAGE));
    assert!(!app.accepts_input());
}

#[test]
fn test_submit_without_session_never_spawns() {
    let mut app = App::new(
        Err(SessionError::Config("no key".to_string())),
        "gemini-2.5-flash".to_string(),
    );
    let effect = update(&mut app, Action::Submit("hello".to_string()));

    assert_eq!(effect, Effect::None);
    assert_eq!(app.transcript.last().map(|m| m.role), Some(Role::Error));
    assert!(!app.is_loading);
}

#[tokio::test]
async fn test_streamed_turn_exports_to_html() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse_response(&["Use `Vec<T>`"]))
        .mount(&mock_server)
        .await;

    let mut app = app_against(&mock_server).await;
    play_turn(&mut app, "<script>alert(1)</script>").await;

    let page = render::render_page(render::PAGE_TITLE, &app.model_name, &app.transcript);
    assert!(page.contains("<title>Dev Assistant Chatbot</title>"));
    assert!(page.contains("Model: gemini-2.5-flash"));
    assert!(page.contains("<code>Vec&lt;T&gt;</code>"));
    assert!(page.contains("&lt;script&gt;"));
    assert!(!page.contains("<script>alert(1)</script>"));
}
