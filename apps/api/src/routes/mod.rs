pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(analysis::handle_analysis))
        .route("/api/v1/skills", get(analysis::handle_list_skills))
        // Generation API
        .route(
            "/api/v1/cover-letters",
            post(generation::handle_create_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/:id",
            get(generation::handle_get_cover_letter)
                .delete(generation::handle_delete_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/:id/state",
            get(generation::handle_get_cover_letter_state),
        )
        .route(
            "/api/v1/cover-letters/:id/refine",
            post(generation::handle_refine),
        )
        .route(
            "/api/v1/cover-letters/:id/finalize",
            post(generation::handle_finalize),
        )
        .route("/api/v1/letters", post(generation::handle_single_letter))
        .route(
            "/api/v1/interview-qa",
            post(generation::handle_interview_qa),
        )
        .route(
            "/api/v1/jobs/extract",
            post(generation::handle_extract_jobs),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;
    use crate::extraction::vocabulary::SkillVocabulary;
    use crate::generation::service::fake::{upstream_failure, FakeGenerationService};
    use crate::generation::service::CoverLetterStyle;
    use crate::generation::sessions::SessionStore;
    use crate::matching::scoring::VerbatimPhraseScorer;

    const RESUME: &str = "Data engineer with 4 years of experience in Python and SQL.\n\
                          MSc in Statistics, University of Leeds.";
    const JOB: &str = "Looking for a Python developer who knows Java.";

    fn state_with(generator: Arc<FakeGenerationService>, sessions: SessionStore) -> AppState {
        AppState::new(
            SkillVocabulary::default(),
            Arc::new(VerbatimPhraseScorer),
            generator,
            sessions,
        )
    }

    fn app_with(generator: FakeGenerationService) -> (Router, Arc<FakeGenerationService>) {
        let generator = Arc::new(generator);
        let state = state_with(generator.clone(), SessionStore::default());
        (build_router(state), generator)
    }

    fn app() -> Router {
        app_with(FakeGenerationService::new()).0
    }

    fn app_with_sessions(sessions: SessionStore) -> Router {
        let generator = Arc::new(FakeGenerationService::new());
        build_router(state_with(generator, sessions))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/cover-letters",
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "lettercraft-api");
    }

    #[tokio::test]
    async fn test_analysis() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/v1/analysis",
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume"]["skills"], json!(["python", "sql"]));
        assert_eq!(body["job_skills"], json!(["java", "python"]));
        assert_eq!(body["match"]["matched"], json!(["python"]));
        assert_eq!(body["match"]["gaps"], json!(["java"]));
        assert_eq!(body["score"]["overall"], json!(0.5));
        assert_eq!(body["resume"]["experience"].as_array().unwrap().len(), 1);
        assert_eq!(body["resume"]["education"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_skills() {
        let (status, body) = send(&app(), "GET", "/api/v1/skills", None).await;
        assert_eq!(status, StatusCode::OK);
        let skills = body["skills"].as_array().unwrap();
        assert_eq!(skills.len(), 10);
        assert_eq!(skills[0], "python");
        assert!(skills.contains(&json!("machine learning")));
    }

    #[tokio::test]
    async fn test_create_cover_letter_drafts_both_versions() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/cover-letters",
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"], "DRAFTED");
        assert_eq!(body["drafts"]["concise"], "concise letter (python, sql)");
        assert_eq!(body["drafts"]["detailed"], "detailed letter (python, sql)");
        assert_eq!(body["final_document"], Value::Null);

        let id = body["id"].as_str().unwrap();
        let uri = format!("/api/v1/cover-letters/{id}");
        let (status, fetched) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["drafts"], body["drafts"]);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_input() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/v1/cover-letters",
            Some(json!({ "resume_text": "  ", "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_failed_generation_stores_no_session() {
        let generator = FakeGenerationService::new()
            .failing_style(CoverLetterStyle::Detailed, upstream_failure());
        let state = state_with(Arc::new(generator), SessionStore::default());
        let sessions = state.sessions.clone();
        let app = build_router(state);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/cover-letters",
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_refine_then_finalize() {
        let (app, generator) = app_with(FakeGenerationService::new());
        let id = create_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/cover-letters/{id}/refine"),
            Some(json!({ "target": "Detailed", "instruction": "Mention Airflow" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);
        let session = &body["session"];
        assert_eq!(
            session["drafts"]["detailed"],
            "detailed letter (python, sql) [Mention Airflow]"
        );
        assert_eq!(session["drafts"]["history"].as_array().unwrap().len(), 1);
        assert_eq!(generator.refine_calls(), 1);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/cover-letters/{id}/finalize"),
            Some(json!({ "version": "detailed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "FINALIZED");
        assert_eq!(body["final_document"]["source_version"], "detailed");
        assert_eq!(
            body["final_document"]["text"],
            "detailed letter (python, sql) [Mention Airflow]"
        );
    }

    #[tokio::test]
    async fn test_refine_blank_instruction_is_skipped() {
        let (app, generator) = app_with(FakeGenerationService::new());
        let id = create_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/cover-letters/{id}/refine"),
            Some(json!({ "target": "concise", "instruction": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
        assert_eq!(generator.refine_calls(), 0);
    }

    #[tokio::test]
    async fn test_refine_with_tone() {
        let (app, generator) = app_with(FakeGenerationService::new());
        let id = create_session(&app).await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/cover-letters/{id}/refine"),
            Some(json!({ "target": "concise", "instruction": "", "tone": "Friendly" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(generator.refine_calls(), 1);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/cover-letters/{id}/refine"),
            Some(json!({ "target": "concise", "instruction": "x", "tone": "grumpy" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_target_is_conflict() {
        let app = app();
        let id = create_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/cover-letters/{id}/finalize"),
            Some(json!({ "version": "medium" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (status, body) = send(
            &app(),
            "GET",
            "/api/v1/cover-letters/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_interview_qa() {
        let (app, generator) = app_with(FakeGenerationService::new());
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/interview-qa",
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["num_questions"], 5);
        let content = body["content"].as_str().unwrap();
        assert!(content.starts_with("1. **Question:**"));
        assert_eq!(generator.calls(), vec!["interview_qa:5"]);

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/interview-qa",
            Some(json!({ "resume_text": RESUME, "job_description": JOB, "num_questions": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_jobs() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/jobs/extract",
            Some(json!({ "page_text": "<h1>Data Engineer</h1>" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["postings"][0]["role"], "Data Engineer");

        let blank = json!({ "page_text": "" });
        let (status, _) = send(&app, "POST", "/api/v1/jobs/extract", Some(blank)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    fn refine_body(instruction: &str) -> Value {
        json!({ "target": "concise", "instruction": instruction })
    }

    #[tokio::test]
    async fn test_delete_cover_letter() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/cover-letters/{id}");

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_expired_session_is_not_found() {
        let app = app_with_sessions(SessionStore::new(Duration::from_millis(300), 10));
        let id = create_session(&app).await;
        let uri = format!("/api/v1/cover-letters/{id}");

        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_session_cap_evicts_oldest() {
        let sessions = SessionStore::new(Duration::from_secs(3600), 2);
        let app = app_with_sessions(sessions.clone());
        let first = create_session(&app).await;
        create_session(&app).await;
        create_session(&app).await;

        assert_eq!(sessions.len().await, 2);
        let uri = format!("/api/v1/cover-letters/{first}");
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_concurrent_refines_on_one_session_are_serialized() {
        let delay = Duration::from_millis(50);
        let (app, generator) = app_with(FakeGenerationService::new().slow_refine(delay));
        let id = create_session(&app).await;
        let uri = format!("/api/v1/cover-letters/{id}/refine");

        let ((first, _), (second, _)) = tokio::join!(
            send(&app, "POST", &uri, Some(refine_body("Add A"))),
            send(&app, "POST", &uri, Some(refine_body("Add B"))),
        );
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(generator.refine_calls(), 2);
        assert_eq!(generator.max_concurrent_refines(), 1);

        let (_, body) = send(&app, "GET", &format!("/api/v1/cover-letters/{id}"), None).await;
        let history = body["drafts"]["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);

        // The second refine starts from the text the first one produced.
        let earlier = history[0]["resulting_text"].as_str().unwrap();
        let later = history[1]["resulting_text"].as_str().unwrap();
        assert!(later.starts_with(earlier));
        assert!(later.contains("[Add A]"));
        assert!(later.contains("[Add B]"));
        assert_ne!(history[0]["instruction"], history[1]["instruction"]);
        assert_eq!(body["drafts"]["concise"], later);
    }

    #[tokio::test]
    async fn test_state_endpoint_reports_refining_in_flight() {
        let gate = Arc::new(Notify::new());
        let (app, _) = app_with(FakeGenerationService::new().gated_refine(gate.clone()));
        let id = create_session(&app).await;
        let state_uri = format!("/api/v1/cover-letters/{id}/state");

        let refine = tokio::spawn({
            let app = app.clone();
            let uri = format!("/api/v1/cover-letters/{id}/refine");
            async move { send(&app, "POST", &uri, Some(refine_body("Shorter"))).await }
        });

        let mut seen = Value::Null;
        for _ in 0..200 {
            let (status, body) = send(&app, "GET", &state_uri, None).await;
            assert_eq!(status, StatusCode::OK);
            seen = body["state"].clone();
            if seen == "REFINING" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(seen, "REFINING");

        gate.notify_one();
        let (status, _) = refine.await.unwrap();
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", &state_uri, None).await;
        assert_eq!(body["id"], id.as_str());
        assert_eq!(body["state"], "DRAFTED");
    }

    #[tokio::test]
    async fn test_state_of_unknown_session_is_not_found() {
        let uri = "/api/v1/cover-letters/00000000-0000-0000-0000-000000000000/state";
        let (status, _) = send(&app(), "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_single_letter_defaults_to_standard_style() {
        let (app, generator) = app_with(FakeGenerationService::new());
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/letters",
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["style"], "standard");
        assert_eq!(body["cover_letter"], "standard letter (python, sql)");
        assert_eq!(generator.calls(), vec!["cover_letter:standard"]);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/letters",
            Some(json!({ "resume_text": RESUME, "job_description": JOB, "style": "detailed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["style"], "detailed");
        assert_eq!(body["cover_letter"], "detailed letter (python, sql)");
    }

    #[tokio::test]
    async fn test_single_letter_rejects_blank_job() {
        let (status, body) = send(
            &app(),
            "POST",
            "/api/v1/letters",
            Some(json!({ "resume_text": RESUME, "job_description": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
