use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use simforge_core::{Belief, CognitionStep, Operation, Uuid};
use simforge_engine::{CompletionBackend, EngineConfig, EngineError, SimForge};
use simforge_gateway::{Gateway, GatewayConfig};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Debug)]
struct FixedBackend {
    reply: Option<String>,
}

#[async_trait::async_trait]
impl CompletionBackend for FixedBackend {
    async fn complete(&self, _system: &str, _user: &str, _temperature: f64) -> simforge_engine::Result<String> {
        self.reply
            .clone()
            .ok_or_else(|| EngineError::Backend("upstream unavailable".to_string()))
    }

    fn provider(&self) -> &str {
        "fixed"
    }

    fn model(&self) -> &str {
        "fixed-model"
    }
}

fn router_with(reply: Option<&str>, dir: &TempDir) -> Router {
    let config = GatewayConfig::default()
        .with_schemas_dir(dir.path().join("schemas"))
        .with_prompts_dir(dir.path().join("prompts"));
    let backend = Arc::new(FixedBackend {
        reply: reply.map(str::to_string),
    });
    let engine = SimForge::with_backend(backend, &EngineConfig::new());
    Gateway::with_engine(config, engine).build_router()
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const SEQUENCE: &str = r#"{
    "title": "Choosing a database",
    "rows": [
        {"goal": "List requirements", "beliefs": [{"content": "Writes dominate", "confidence": 0.8}], "operation": "Reflect", "output": "Need fast writes"},
        {"goal": "Pick a store", "beliefs": [], "operation": "Act", "output": "Use Postgres"}
    ]
}"#;

#[tokio::test]
async fn health_reports_running() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(router_with(None, &dir), "GET", "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "SimForge API is running");
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn generate_returns_sequences_and_metadata() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(
        router_with(Some(SEQUENCE), &dir),
        "POST",
        "/api/v1/cognition/generate",
        Some(json!({"context": "Pick a database for a write-heavy service", "n": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["sequences"].as_array().unwrap().len(), 2);
    assert_eq!(data["sequences"][0]["title"], "Choosing a database");
    assert_eq!(data["sequences"][0]["rows"][1]["operation"], "Act");
    assert_eq!(data["metadata"]["model"], "fixed-model");
    assert_eq!(data["metadata"]["provider"], "fixed");
    assert_eq!(data["metadata"]["total_generated"], 2);
    assert_eq!(data["metadata"]["valid_sequences"], 2);
    assert_eq!(data["metadata"]["temperature"], 0.7);
}

#[tokio::test]
async fn generate_rejects_out_of_bounds_requests() {
    let dir = TempDir::new().unwrap();
    for body in [
        json!({"context": "x", "n": 11}),
        json!({"context": "x", "temperature": 3.0}),
        json!({"n": 1}),
    ] {
        let (status, response) = send(
            router_with(Some(SEQUENCE), &dir),
            "POST",
            "/api/v1/cognition/generate",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["success"], false);
    }
}

#[tokio::test]
async fn generate_surfaces_transport_faults_as_bad_gateway() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(
        router_with(None, &dir),
        "POST",
        "/api/v1/cognition/generate",
        Some(json!({"context": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}

fn fork_body(step: &CognitionStep, fork_type: &str) -> Value {
    json!({
        "row_id": step.id,
        "sequence_id": Uuid::new_v4(),
        "num_forks": 2,
        "fork_type": fork_type,
        "row": step,
    })
}

#[tokio::test]
async fn fork_links_forks_to_the_row() {
    let dir = TempDir::new().unwrap();
    let step = CognitionStep::new(
        "Pick a store",
        vec![Belief::new("Writes dominate", 0.8).unwrap()],
        Operation::Act,
    );
    let reply = r#"{"forks": [
        {"goal": "Pick a store", "operation": "Plan", "output": "Benchmark first"},
        {"goal": "Pick a store", "operation": "Reflect", "output": "Revisit needs"},
        {"goal": "Pick a store", "operation": "Fork", "output": "Try both"}
    ]}"#;

    let (status, body) = send(
        router_with(Some(reply), &dir),
        "POST",
        "/api/v1/cognition/fork",
        Some(fork_body(&step, "alternative_operation")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let forks = body["data"]["forks"].as_array().unwrap();
    assert_eq!(forks.len(), 2);
    for fork in forks {
        assert_eq!(fork["parent_id"], json!(step.id));
        assert_eq!(fork["goal"], "Pick a store");
    }
    assert_eq!(body["data"]["metadata"]["fork_type"], "alternative_operation");
    assert_eq!(body["data"]["metadata"]["valid_forks"], 2);
}

#[tokio::test]
async fn fork_rejects_bad_input() {
    let dir = TempDir::new().unwrap();
    let step = CognitionStep::new("g", vec![], Operation::Plan);

    let (status, _) = send(
        router_with(Some("[]"), &dir),
        "POST",
        "/api/v1/cognition/fork",
        Some(fork_body(&step, "sideways")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut mismatched = fork_body(&step, "change_goal");
    mismatched["row_id"] = json!(Uuid::new_v4());
    let (status, _) = send(
        router_with(Some("[]"), &dir),
        "POST",
        "/api/v1/cognition/fork",
        Some(mismatched),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn schema_and_prompt_libraries() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("schemas")).unwrap();
    std::fs::create_dir(dir.path().join("prompts")).unwrap();
    std::fs::write(
        dir.path().join("schemas/trace.json"),
        r#"{"type": "object", "required": ["title"]}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("prompts/support.txt"), "Customer support agent").unwrap();

    let (status, body) = send(router_with(None, &dir), "GET", "/api/v1/schemas", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schemas"][0]["required"][0], "title");

    let (status, body) = send(router_with(None, &dir), "GET", "/api/v1/schemas/trace", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "object");

    let (status, _) = send(router_with(None, &dir), "GET", "/api/v1/schemas/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(router_with(None, &dir), "GET", "/api/v1/prompts/..", None).await;
    assert_ne!(status, StatusCode::OK);

    let (status, body) = send(router_with(None, &dir), "GET", "/api/v1/prompts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["prompts"][0]["name"], "support");

    let (status, body) = send(router_with(None, &dir), "GET", "/api/v1/prompts/support", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "Customer support agent");
}

#[tokio::test]
async fn missing_library_directories_list_empty() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(router_with(None, &dir), "GET", "/api/v1/prompts", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["prompts"], json!([]));
}

#[tokio::test]
async fn validate_payload_against_schema() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(
        router_with(None, &dir),
        "POST",
        "/api/v1/schemas/validate",
        Some(json!({
            "data": {"count": "three"},
            "schema": {
                "required": ["title"],
                "properties": {"count": {"type": "integer"}}
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_valid"], false);
    let errors = body["data"]["errors"].as_array().unwrap();
    assert!(errors.contains(&json!("Missing required field: title")));
    assert!(errors.contains(&json!("Field count should be an integer")));
}

#[test]
fn state_libraries_read_from_configured_directories() {
    let dir = TempDir::new().unwrap();
    let config = GatewayConfig::default()
        .with_schemas_dir(dir.path().join("schemas"))
        .with_prompts_dir(dir.path().join("prompts"));
    let backend = Arc::new(FixedBackend { reply: None });
    let engine = SimForge::with_backend(backend, &EngineConfig::new());

    let state = Gateway::with_engine(config, engine).state();
    assert_eq!(state.schemas.root(), dir.path().join("schemas"));
    assert_eq!(state.prompts.root(), dir.path().join("prompts"));
}
