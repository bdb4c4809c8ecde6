pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::advisor::handlers as advisor;
use crate::session::handlers as session;
use crate::state::AppState;
use crate::users::handlers as users;

/// Routes mounted both at the root and under `/api`, where the web client calls them.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/signup", post(users::handle_signup))
        .route("/login", post(users::handle_login))
        .route("/forgot-password", post(users::handle_forgot_password))
        // Advisor features
        .route("/chat", post(advisor::handle_chat))
        .route("/assess", post(advisor::handle_assess))
        .route("/skills", post(advisor::handle_skills))
        .route("/resume", post(advisor::handle_resume))
        .route("/market", post(advisor::handle_market))
        .route("/learning", post(advisor::handle_learning))
        // Transcript management
        .route(
            "/clear-chat",
            get(session::handle_clear).post(session::handle_clear),
        )
        .route("/save-chat", post(session::handle_save))
        .route("/chats", get(session::handle_list_chats))
        .route("/load-chat", post(session::handle_load_chat))
        .route("/history", get(session::handle_history))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .merge(api_routes())
        .nest("/api", api_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::{CountingGenerator, FakeGenerator};
    use crate::llm_client::TextGenerator;

    fn test_config() -> Config {
        Config {
            gemini_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            generation_timeout_secs: 5,
        }
    }

    fn test_state(generator: Arc<dyn TextGenerator>) -> AppState {
        AppState::new(test_config(), generator)
    }

    fn echo_state() -> AppState {
        test_state(Arc::new(FakeGenerator::Echo("advice: ")))
    }

    fn post_json(uri: &str, headers: &[(&str, &str)], body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn request(method: &str, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn register(state: &AppState, username: &str) {
        let (status, _) = send(
            state,
            post_json(
                "/signup",
                &[],
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "secret1",
                    "confirm_password": "secret1"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let state = echo_state();
        let (status, body) = send(&state, request("GET", "/", &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "CareerAI API is running!");

        let (status, body) = send(&state, request("GET", "/health", &[])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn test_chat_without_header_uses_guest_and_echoes_history() {
        let state = echo_state();

        let (status, body) = send(&state, post_json("/chat", &[], json!({"message": "Hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "advice: As a career advisor, answer: Hi");
        assert_eq!(body["updated_history"], true);

        let (_, body) = send(&state, post_json("/chat", &[], json!({"message": "Again"}))).await;
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0][0], "Hi");
        assert_eq!(history[1][0], "Again");

        assert_eq!(state.sessions.transcript("guest").len(), 2);
    }

    #[tokio::test]
    async fn test_api_prefix_reaches_same_store() {
        let state = echo_state();
        send(
            &state,
            post_json("/api/chat", &[("session-id", "web")], json!({"message": "Hi"})),
        )
        .await;

        let (status, body) = send(&state, request("GET", "/history", &[("session-id", "web")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history"], json!([["Hi", "advice: As a career advisor, answer: Hi"]]));
        assert_eq!(body["saved"], false);
        assert_eq!(body["state"], "has_unsaved_turns");
    }

    #[tokio::test]
    async fn test_history_creates_empty_session() {
        let state = echo_state();
        let (_, body) = send(&state, request("GET", "/api/history", &[])).await;
        assert_eq!(body["session_id"], "guest");
        assert_eq!(body["history"], json!([]));
        assert_eq!(body["state"], "empty_and_saved");
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_kept_apart() {
        let state = echo_state();
        send(
            &state,
            post_json("/chat", &[("session-id", "a")], json!({"message": "from a"})),
        )
        .await;
        let (_, body) = send(
            &state,
            post_json("/chat", &[("session-id", "b")], json!({"message": "from b"})),
        )
        .await;

        assert_eq!(body["history"].as_array().unwrap().len(), 1);
        assert_eq!(state.sessions.transcript("a")[0].input, "from a");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_before_generation() {
        let generator = Arc::new(CountingGenerator::default());
        let state = test_state(generator.clone());

        let (status, body) =
            send(&state, post_json("/chat", &[], json!({"message": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Message cannot be empty");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_failed_generation_does_not_append() {
        let state = test_state(Arc::new(FakeGenerator::Fail));
        state.sessions.append_turn("s1", "earlier", "answer");

        let (status, body) = send(
            &state,
            post_json("/chat", &[("session-id", "s1")], json!({"message": "Hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Error: "));
        assert_eq!(state.sessions.transcript("s1").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_timeout_does_not_append() {
        let state = test_state(Arc::new(FakeGenerator::Stall));

        let (status, body) = send(
            &state,
            post_json("/assess", &[("session-id", "s1")], json!({
                "q1": "Remote", "q2": "Leadership", "q3": "Technical tasks",
                "q4": "High flexibility", "q5": "Project-based"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("timed out"));
        assert!(state.sessions.get("s1").is_none());
    }

    #[tokio::test]
    async fn test_feature_endpoints_record_their_input_labels() {
        let state = echo_state();
        let headers = [("session-id", "s1")];

        send(&state, post_json("/skills", &headers, json!({
            "current_skills": "Python", "target_role": "Data Scientist"
        })))
        .await;
        send(&state, post_json("/resume", &headers, json!({
            "job_role": "Nurse", "experience_level": "Senior Level"
        })))
        .await;
        send(&state, post_json("/market", &headers, json!({
            "field": "Finance", "location": "London"
        })))
        .await;
        let (status, body) = send(&state, post_json("/learning", &headers, json!({
            "skill": "SQL", "learning_style": "Visual"
        })))
        .await;
        assert_eq!(status, StatusCode::OK);

        let inputs: Vec<String> = body["history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|turn| turn[0].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            inputs,
            vec![
                "Skills Analysis: Python -> Data Scientist",
                "Resume Tips: Nurse (Senior Level)",
                "Market Insights: Finance in London",
                "Learning Resources: SQL (Visual)",
            ]
        );
    }

    #[tokio::test]
    async fn test_feature_validation_message() {
        let state = echo_state();
        let (status, body) = send(
            &state,
            post_json("/market", &[], json!({"field": "Finance", "location": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please fill both fields");
    }

    #[tokio::test]
    async fn test_clear_returns_empty_history_even_when_absent() {
        let state = echo_state();
        let (status, body) =
            send(&state, request("GET", "/clear-chat", &[("session-id", "nobody")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Chat cleared!", "history": []}));

        send(&state, post_json("/chat", &[], json!({"message": "Hi"}))).await;
        let (_, body) = send(&state, request("POST", "/clear-chat", &[])).await;
        assert_eq!(body["history"], json!([]));
        assert!(state.sessions.get("guest").unwrap().saved);
    }

    #[tokio::test]
    async fn test_save_flow() {
        let state = echo_state();
        register(&state, "alice").await;
        let save_headers = [("session-id", "s1"), ("username", "alice")];

        let (status, body) = send(&state, request("POST", "/save-chat", &[("session-id", "s1")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please login to save chats");

        let (status, body) = send(&state, request("POST", "/save-chat", &save_headers)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No chat to save");

        send(
            &state,
            post_json("/chat", &[("session-id", "s1")], json!({"message": "When did I last work out?"})),
        )
        .await;

        let (status, body) = send(&state, request("POST", "/save-chat", &save_headers)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Chat saved successfully!");

        let (status, body) = send(&state, request("POST", "/save-chat", &save_headers)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Chat already saved");

        let (_, body) = send(&state, request("GET", "/chats", &[("username", "alice")])).await;
        let labels = body["chat_history"].as_array().unwrap();
        assert_eq!(labels.len(), 1);
        assert!(labels[0]
            .as_str()
            .unwrap()
            .ends_with(" - When did I last work out?"));
    }

    #[tokio::test]
    async fn test_chat_list_requires_known_user() {
        let state = echo_state();
        register(&state, "alice").await;

        for headers in [&[("username", "ghost")][..], &[][..]] {
            let (status, body) = send(&state, request("GET", "/api/chats", headers)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
            assert_eq!(body["error"]["message"], "Please login to load chats");
        }

        let (status, body) = send(&state, request("GET", "/api/chats", &[("username", "alice")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chat_history"], json!([]));
    }

    #[tokio::test]
    async fn test_login_starts_session_and_lists_saved_chats() {
        let state = echo_state();
        register(&state, "alice").await;

        let (status, body) = send(
            &state,
            post_json("/login", &[], json!({"username": "alice", "password": "nope!!"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid username or password");

        let (status, body) = send(
            &state,
            post_json("/login", &[], json!({"username": "alice", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome back, alice!");
        assert_eq!(body["chat_history"], json!([]));

        let session_id = body["session_id"].as_str().unwrap().to_string();
        assert!(session_id.starts_with("alice_"));
        let record = state.sessions.get(&session_id).unwrap();
        assert!(record.transcript.is_empty());
        assert!(record.saved);
    }

    #[tokio::test]
    async fn test_load_chat_restores_saved_transcript() {
        let state = echo_state();
        register(&state, "alice").await;
        send(
            &state,
            post_json("/chat", &[("session-id", "s1")], json!({"message": "Hi"})),
        )
        .await;
        send(
            &state,
            request("POST", "/save-chat", &[("session-id", "s1"), ("username", "alice")]),
        )
        .await;
        let label = state.users.titles("alice").unwrap().remove(0);

        let (status, body) = send(
            &state,
            post_json(
                "/load-chat",
                &[("session-id", "s2"), ("username", "alice")],
                json!({"label": label}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Chat loaded successfully!");
        assert_eq!(body["history"][0][0], "Hi");

        let (status, body) = send(
            &state,
            post_json(
                "/load-chat",
                &[("session-id", "s2"), ("username", "alice")],
                json!({"label": "missing"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Chat not found");
    }

    #[tokio::test]
    async fn test_signup_and_forgot_password_messages() {
        let state = echo_state();
        let (status, body) = send(
            &state,
            post_json("/signup", &[], json!({
                "username": "bob", "email": "bob@example.com",
                "password": "abc", "confirm_password": "abc"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Password must be at least 6 characters");

        register(&state, "bob").await;

        let (status, body) = send(
            &state,
            post_json("/forgot-password", &[], json!({"email": "bob@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password reset instructions sent to your email!");

        let (status, body) = send(
            &state,
            post_json("/forgot-password", &[], json!({"email": "carol@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Email not found");
    }
}
