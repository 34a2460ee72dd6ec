pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("No route for this path".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/capabilities", get(handlers::handle_capabilities))
        .route("/api/v1/jobs/default", get(handlers::handle_default_job))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/analyze/upload",
            post(handlers::handle_analyze_upload),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::{GenerationConfig, GenerationKind, TextGenerator};
    use crate::storage::ResultStore;

    struct CannedGenerator;

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, kind: GenerationKind, _prompt: &str) -> String {
            format!("canned {kind:?}")
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    const RESUME: &str = "Name: Grace Hopper\nEmail: grace@navy.mil\n\
                          Education: PhD Mathematics\nExperience: 12\n\
                          Skills: COBOL, Compilers";

    fn test_state(dir: &TempDir, generator: Option<Arc<dyn TextGenerator>>) -> AppState {
        let config = Config {
            port: 0,
            rust_log: "debug".to_string(),
            results_dir: dir.path().join("results"),
            default_job_path: dir.path().join("job_description.json"),
            generation: GenerationConfig::default()
                .with_binary("fake-ollama")
                .with_timeout(Duration::from_secs(5)),
        };
        AppState {
            store: ResultStore::new(config.results_dir.clone()),
            config,
            generator,
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send(build_router(test_state(&dir, None)), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-analyzer");
        assert_eq!(body["ai_available"], false);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_json() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send(build_router(test_state(&dir, None)), get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_capabilities_reflect_startup_probe() {
        let dir = TempDir::new().unwrap();
        let (_, body) = send(
            build_router(test_state(&dir, None)),
            get("/api/v1/capabilities"),
        )
        .await;
        assert_eq!(body["ai_available"], false);
        assert_eq!(body["binary"], "fake-ollama");
        assert_eq!(body["model"], "qwen2.5");
        assert_eq!(body["timeout_secs"], 5.0);

        let state = test_state(&dir, Some(Arc::new(CannedGenerator)));
        let (_, body) = send(build_router(state), get("/api/v1/capabilities")).await;
        assert_eq!(body["ai_available"], true);
    }

    #[tokio::test]
    async fn test_default_job_is_lenient() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send(
            build_router(test_state(&dir, None)),
            get("/api/v1/jobs/default"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        std::fs::write(
            dir.path().join("job_description.json"),
            r#"{"title": "Compiler Engineer", "required_skills": ["cobol"]}"#,
        )
        .unwrap();
        let (_, body) = send(
            build_router(test_state(&dir, None)),
            get("/api/v1/jobs/default"),
        )
        .await;
        assert_eq!(body["title"], "Compiler Engineer");
    }

    #[tokio::test]
    async fn test_analyze_json_scores_and_saves() {
        let dir = TempDir::new().unwrap();
        let app = build_router(test_state(&dir, None));
        let (status, body) = send(
            app,
            post_json(
                "/api/v1/analyze",
                json!({
                    "job": {
                        "title": "Compiler Engineer",
                        "min_experience_years": "10",
                        "required_education": "phd",
                        "skills": ["COBOL", "Compilers"]
                    },
                    "resumes": [{"file_name": "grace.txt", "content": RESUME}]
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("ai_notice").is_none());
        assert_eq!(body["jobs"][0]["min_experience_years"], 10);

        let candidate = &body["candidates"][0];
        assert_eq!(candidate["status"], "analyzed");
        let report = &candidate["reports"][0]["data"];
        assert_eq!(report["match_score"], 100.0);
        assert_eq!(report["recommendation"], "STRONGLY RECOMMENDED");
        assert_eq!(report["matched_skills"], json!(["cobol", "compilers"]));
        assert!(report.get("ai_explanation").is_none());
        assert!(candidate["saved_to"]
            .as_str()
            .unwrap()
            .contains("grace_hopper_grace_"));
    }

    #[tokio::test]
    async fn test_analyze_accepts_job_as_raw_text() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send(
            build_router(test_state(&dir, None)),
            post_json(
                "/api/v1/analyze",
                json!({
                    "job": r#"[{"title": "A"}, 3, {"title": "B"}]"#,
                    "resumes": [{"file_name": "g.txt", "content": RESUME}]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobs"].as_array().unwrap().len(), 2);
        assert_eq!(
            body["candidates"][0]["reports"].as_array().unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_analyze_validation_messages() {
        let dir = TempDir::new().unwrap();

        let (status, body) = send(
            build_router(test_state(&dir, None)),
            post_json("/api/v1/analyze", json!({"job": {"title": "A"}, "resumes": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please upload at least one resume.");

        let resumes = json!([{"file_name": "g.txt", "content": RESUME}]);
        let (status, body) = send(
            build_router(test_state(&dir, None)),
            post_json("/api/v1/analyze", json!({"job": "  ", "resumes": resumes})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Please provide a job description (paste or upload)."
        );

        let (status, body) = send(
            build_router(test_state(&dir, None)),
            post_json("/api/v1/analyze", json!({"job": "{not json", "resumes": resumes})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_JOB_DESCRIPTION");
        assert_eq!(
            body["error"]["message"],
            "Invalid job description JSON. Please check syntax."
        );

        let (_, body) = send(
            build_router(test_state(&dir, None)),
            post_json("/api/v1/analyze", json!({"job": 42, "resumes": resumes})),
        )
        .await;
        assert_eq!(
            body["error"]["message"],
            "Job description must be a JSON object or list of objects."
        );

        let (_, body) = send(
            build_router(test_state(&dir, None)),
            post_json("/api/v1/analyze", json!({"job": [1, "x"], "resumes": resumes})),
        )
        .await;
        assert_eq!(
            body["error"]["message"],
            "No valid job descriptions found. Please check your JSON input."
        );
    }

    #[tokio::test]
    async fn test_ai_requested_but_unavailable_sets_notice() {
        let dir = TempDir::new().unwrap();
        let (status, body) = send(
            build_router(test_state(&dir, None)),
            post_json(
                "/api/v1/analyze",
                json!({
                    "job": {"title": "A", "required_education": "phd", "required_skills": ["cobol"]},
                    "resumes": [{"file_name": "g.txt", "content": RESUME}],
                    "use_ai_explanation": true
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["ai_notice"],
            "fake-ollama not found! AI features will be disabled."
        );
        let report = &body["candidates"][0]["reports"][0]["data"];
        assert!(report.get("ai_explanation").is_none());
        assert_eq!(report["match_score"], 100.0);
    }

    #[tokio::test]
    async fn test_ai_enrichment_when_available() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, Some(Arc::new(CannedGenerator)));
        let (_, body) = send(
            build_router(state),
            post_json(
                "/api/v1/analyze",
                json!({
                    "job": {"title": "A"},
                    "resumes": [{"file_name": "g.txt", "content": RESUME}],
                    "use_ai_questions": true
                }),
            ),
        )
        .await;
        assert!(body.get("ai_notice").is_none());
        let report = &body["candidates"][0]["reports"][0]["data"];
        assert_eq!(report["ai_interview_questions"], "canned Questions");
        assert!(report.get("ai_explanation").is_none());
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        const BOUNDARY: &str = "analyzer-test-boundary";
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(f) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(content);
            body.extend_from_slice(&b"\r\n"[..]);
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/v1/analyze/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_prefers_job_file_and_isolates_bad_resume() {
        let dir = TempDir::new().unwrap();
        let req = multipart_request(&[
            ("job_json", None, br#"{"title": "From Text"}"#.as_slice()),
            ("job_file", Some("job.json"), br#"{"title": "From File"}"#.as_slice()),
            ("resume", Some("broken.txt"), &[0xff_u8, 0xfe][..]),
            ("resume", Some("Grace Resume.txt"), RESUME.as_bytes()),
            ("use_ai_explanation", None, &b"false"[..]),
        ]);
        let (status, body) = send(build_router(test_state(&dir, None)), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobs"][0]["title"], "From File");

        let candidates = body["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0]["status"], "failed");
        assert!(candidates[0]["error"]
            .as_str()
            .unwrap()
            .starts_with("Error reading broken.txt:"));
        assert_eq!(candidates[1]["status"], "analyzed");
        assert!(candidates[1]["saved_to"]
            .as_str()
            .unwrap()
            .contains("grace_hopper_grace_resume_"));
    }

    #[tokio::test]
    async fn test_upload_requires_resume_and_job() {
        let dir = TempDir::new().unwrap();

        let req = multipart_request(&[("job_json", None, br#"{"title": "A"}"#.as_slice())]);
        let (status, body) = send(build_router(test_state(&dir, None)), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please upload at least one resume.");

        let req = multipart_request(&[
            ("job_file", Some(""), &b""[..]),
            ("job_json", None, &b"   "[..]),
            ("resume", Some("g.txt"), RESUME.as_bytes()),
        ]);
        let (status, body) = send(build_router(test_state(&dir, None)), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Please provide a job description (paste or upload)."
        );
    }
}
