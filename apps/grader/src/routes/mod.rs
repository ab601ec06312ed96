pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalogue
        .route("/api/v1/units", get(handlers::handle_list_units))
        .route("/api/v1/units/:code", get(handlers::handle_get_unit))
        // Evaluation
        .route("/api/v1/evaluations", post(handlers::handle_evaluate))
        .route(
            "/api/v1/evaluations/upload",
            post(handlers::handle_evaluate_upload),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::evaluation::flags::FlagThresholds;
    use crate::evaluation::Evaluator;
    use crate::rubric::Catalogue;

    fn app() -> Router {
        let config = Config {
            anthropic_api_key: None,
            remote_timeout: Duration::from_secs(60),
            remote_max_attempts: 1,
            catalogue_path: None,
            port: 8080,
            rust_log: "info".to_string(),
            flag_thresholds: FlagThresholds::default(),
        };
        let catalogue = Arc::new(Catalogue::builtin().unwrap());
        build_router(AppState {
            evaluator: Arc::new(Evaluator::new(catalogue, None)),
            config,
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn essay() -> String {
        "This analysis explains trending AI technologies and evaluates their impact \
         on retail organisations using evidence from recent research (Smith, 2021). "
            .repeat(6)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scorer"], "local_heuristic");
        assert_eq!(body["units"], 3);
    }

    #[tokio::test]
    async fn test_list_units() {
        let response = app()
            .oneshot(Request::get("/api/v1/units").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["default_rubric_id"], "qualifi-l4-v1");
        assert_eq!(body["units"][0]["code"], "L4-AI-01");
        assert_eq!(body["units"][0]["criteria_count"], 5);
        assert_eq!(body["units"][0]["max_score"], 100);
    }

    #[tokio::test]
    async fn test_get_unit_is_case_insensitive() {
        let response = app()
            .oneshot(Request::get("/api/v1/units/l4-ai-01").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["title"], "Artificial Intelligence in Business");
        assert_eq!(body["rubric"]["id"], "qualifi-l4-v1");
    }

    #[tokio::test]
    async fn test_unknown_unit_is_404() {
        let response = app()
            .oneshot(Request::get("/api/v1/units/NOPE").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_evaluate_json() {
        let request = json!({
            "unit_code": "L4-AI-01",
            "assignment_text": essay(),
            "learner_name": "Sam Doe",
            "rubric_text": "SUMMATIVE TASK\nWrite about AI in business."
        });
        let response = app()
            .oneshot(
                Request::post("/api/v1/evaluations")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["unit_code"], "L4-AI-01");
        assert_eq!(body["learner_name"], "Sam Doe");
        assert_eq!(body["scorer_backend"], "local_heuristic");
        assert_eq!(body["max_score"], 100);
        assert_eq!(body["criteria_achievements"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_invalid_rubric_is_400() {
        let request = json!({
            "unit_code": "L4-AI-01",
            "assignment_text": essay(),
            "criteria": [
                {"name": "Content", "max_score": 10, "weight": 0.5},
                {"name": "Theory", "max_score": 10, "weight": 0.2}
            ]
        });
        let response = app()
            .oneshot(
                Request::post("/api/v1/evaluations")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_RUBRIC");
    }

    fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match file_name {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }

    fn upload(body: Vec<u8>, boundary: &str) -> Request<Body> {
        Request::post("/api/v1/evaluations/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_text_files() {
        let boundary = "grader-boundary";
        let essay = essay();
        let body = multipart_body(
            boundary,
            &[
                ("unit_code", None, b"L4-MGT-03".as_slice()),
                ("learner_id", None, b"Q-77".as_slice()),
                ("rubric", Some("brief.txt"), b"SUMMATIVE TASK\nDiscuss leadership.".as_slice()),
                ("assignment", Some("essay.txt"), essay.as_bytes()),
            ],
        );
        let response = app().oneshot(upload(body, boundary)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["unit_code"], "L4-MGT-03");
        assert_eq!(body["learner_id"], "Q-77");
        assert!(body.get("learner_name").is_none());
    }

    #[tokio::test]
    async fn test_upload_binary_assignment_is_400() {
        let boundary = "grader-boundary";
        let body = multipart_body(
            boundary,
            &[
                ("unit_code", None, b"L4-AI-01".as_slice()),
                ("assignment", Some("essay.bin"), b"\xff\xfe\x00\x9f".as_slice()),
            ],
        );
        let response = app().oneshot(upload(body, boundary)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "non-text submission");
    }

    #[tokio::test]
    async fn test_upload_without_assignment_is_400() {
        let boundary = "grader-boundary";
        let body = multipart_body(boundary, &[("unit_code", None, b"L4-AI-01".as_slice())]);
        let response = app().oneshot(upload(body, boundary)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
