//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Landing page and `/static` assets
//! - `/persona` (session start) and `/chat`
//! - Health / heartbeat route
//! - Optional OpenAPI document (disable with `PARLEY_ENABLE_API_DOCS=false`)

mod chat;
pub mod doc;
mod health;
mod index;
mod persona;

use axum::routing::get;
use axum::{Json, Router, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(index::router(&state))
        .merge(persona::router())
        .merge(chat::router())
        .merge(health::router());

    if state.config.enable_api_docs {
        let api_doc = doc::get_docs();
        app = app.route(
            "/api-docs/openapi.json",
            get(move || {
                let doc = api_doc.clone();
                async move { Json(doc) }
            }),
        );
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state)))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use parley_core::oracle::ScriptedOracle;
    use parley_core::{CompletionGateway, CompletionParams, ConversationService, Persona};

    use crate::config::Config;
    use crate::state::AppState;

    pub const BUNDLED_PERSONA: &str = include_str!("../../assets/persona.json");

    fn state(gateway: Option<Arc<CompletionGateway>>) -> Arc<AppState> {
        let config = Config::from_lookup(|_| None);
        let persona = Persona::from_json_str(BUNDLED_PERSONA).expect("bundled persona parses");
        Arc::new(AppState {
            conversations: Arc::new(ConversationService::new(
                Arc::new(persona),
                config.transcript_policy(),
            )),
            config: Arc::new(config),
            gateway,
        })
    }

    pub fn state_without_credential() -> Arc<AppState> {
        state(None)
    }

    pub fn state_with_oracle(oracle: Arc<ScriptedOracle>) -> Arc<AppState> {
        state(Some(Arc::new(CompletionGateway::new(
            oracle,
            CompletionParams::default(),
        ))))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::test_support::{state_with_oracle, state_without_credential};
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use parley_core::oracle::ScriptedOracle;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_chat(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn persona_then_chat_scenario() {
        let oracle = Arc::new(ScriptedOracle::always(
            r#"{"alex_spoken_response":"Hi","is_off_topic":true}"#,
        ));
        let state = state_with_oracle(oracle.clone());
        let app = build(state.clone());

        let (status, persona) = send(&app, get("/persona")).await;
        assert_eq!(status, StatusCode::OK);
        let session_id = persona["session_id"].as_str().unwrap().to_owned();
        for key in ["name", "role", "scenario", "goal", "opening_message"] {
            assert!(persona.get(key).is_some(), "missing {key}");
        }

        let (status, body) =
            send(&app, post_chat(json!({ "message": "hello", "session_id": session_id }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "session_id": session_id,
                "alex_spoken_response": "Hi",
                "is_off_topic": true,
                "goal_alignment_score": 0,
                "alex_perception": "",
                "alex_inner_thought": "",
                "coaching_tip": "",
                "director_warning": ""
            })
        );
        assert_eq!(oracle.calls(), 1);
        assert_eq!(
            state.conversations.sessions().transcript(&session_id).unwrap().len(),
            4
        );
    }

    #[tokio::test]
    async fn persona_issues_fresh_ids() {
        let app = build(state_without_credential());
        let (_, a) = send(&app, get("/persona")).await;
        let (_, b) = send(&app, get("/persona")).await;
        assert_ne!(a["session_id"], b["session_id"]);
    }

    #[tokio::test]
    async fn unknown_session_is_400_without_oracle_call() {
        let oracle = Arc::new(ScriptedOracle::always("{}"));
        let state = state_with_oracle(oracle.clone());
        let app = build(state.clone());

        let (status, body) =
            send(&app, post_chat(json!({ "message": "hello", "session_id": "not-real" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid session. Please refresh the page.");
        assert_eq!(oracle.calls(), 0);
        assert!(state.conversations.sessions().is_empty());
    }

    #[tokio::test]
    async fn absent_or_empty_session_is_400() {
        let oracle = Arc::new(ScriptedOracle::always("{}"));
        let app = build(state_with_oracle(oracle.clone()));

        let (status, _) = send(&app, post_chat(json!({ "message": "hello" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) =
            send(&app, post_chat(json!({ "message": "hello", "session_id": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn missing_credential_is_500() {
        let state = state_without_credential();
        let app = build(state.clone());
        let (_, persona) = send(&app, get("/persona")).await;

        let (status, body) = send(
            &app,
            post_chat(json!({ "message": "hello", "session_id": persona["session_id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "OpenAI API key not configured. Please set OPENAI_API_KEY environment variable."
        );
    }

    #[tokio::test]
    async fn oracle_failure_is_500_with_detail() {
        let oracle = Arc::new(ScriptedOracle::always("definitely not json"));
        let state = state_with_oracle(oracle);
        let app = build(state.clone());
        let (_, persona) = send(&app, get("/persona")).await;
        let session_id = persona["session_id"].as_str().unwrap().to_owned();

        let (status, body) =
            send(&app, post_chat(json!({ "message": "hello", "session_id": session_id }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Error processing request: reply is not valid JSON")
        );
        assert_eq!(
            state.conversations.sessions().transcript(&session_id).unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn malformed_body_is_400_json() {
        let app = build(state_with_oracle(Arc::new(ScriptedOracle::always("{}"))));
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn trace_id_is_echoed() {
        let app = build(state_without_credential());
        let trace_id = "6f1c0c8e-2f65-4c55-9a8e-0d9c0e4b7a10";
        let req = Request::builder()
            .uri("/health")
            .header(trace::X_TRACE_ID, trace_id)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.headers()[trace::X_TRACE_ID], trace_id);
    }

    #[tokio::test]
    async fn index_serves_html() {
        let app = build(state_without_credential());
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn openapi_document_lists_endpoints() {
        let app = build(state_without_credential());
        let (status, doc) = send(&app, get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        for path in ["/persona", "/chat", "/health"] {
            assert!(doc["paths"].get(path).is_some(), "missing {path}");
        }
    }
}
