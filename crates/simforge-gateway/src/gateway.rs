//! Main Gateway implementation
//!
//! Axum router over a shared [`SimForge`] engine plus the file libraries.
//! Generated values are re-checked by the [`Validator`] before they are
//! returned; anything that fails is dropped from the response.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use simforge_core::{SchemaCheck, Validator};
use simforge_engine::SimForge;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{
    ApiResponse, ForkMetadata, ForkRequest, ForkResponse, GenerateRequest, GenerateResponse,
    GenerationMetadata, SchemaValidationRequest,
};
use crate::config::GatewayConfig;
use crate::library::{PromptFile, PromptLibrary, SchemaLibrary};
use crate::{GatewayError, Result, VERSION};

/// Gateway state shared across handlers
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub engine: SimForge,
    pub validator: Validator,
    pub schemas: SchemaLibrary,
    pub prompts: PromptLibrary,
}

impl GatewayState {
    pub fn new(config: GatewayConfig, engine: SimForge) -> Self {
        Self {
            schemas: SchemaLibrary::new(&config.schemas_dir),
            prompts: PromptLibrary::new(&config.prompts_dir),
            validator: Validator::new(),
            engine,
            config,
        }
    }
}

/// Main Gateway
#[derive(Debug)]
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Create a gateway, building the engine from `config.engine`.
    ///
    /// Fails on an unsupported provider or a missing credential.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let engine = SimForge::from_config(&config.engine)?;
        Ok(Self::with_engine(config, engine))
    }

    /// Create a gateway around an existing engine
    pub fn with_engine(config: GatewayConfig, engine: SimForge) -> Self {
        Self {
            state: Arc::new(GatewayState::new(config, engine)),
        }
    }

    /// Get gateway state
    pub fn state(&self) -> Arc<GatewayState> {
        self.state.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        let api = Router::new()
            .route("/health", get(Self::handle_health))
            .route("/cognition/generate", post(Self::handle_generate))
            .route("/cognition/fork", post(Self::handle_fork))
            .route("/schemas", get(Self::handle_list_schemas))
            .route("/schemas/validate", post(Self::handle_validate_schema))
            .route("/schemas/:name", get(Self::handle_get_schema))
            .route("/prompts", get(Self::handle_list_prompts))
            .route("/prompts/:name", get(Self::handle_get_prompt));

        let prefix = self.state.config.normalized_prefix();
        let router = if prefix.is_empty() {
            api
        } else {
            Router::new().nest(&prefix, api)
        };

        router
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the gateway server and run until Ctrl+C
    pub async fn start(&self) -> Result<()> {
        let addr = self.state.config.socket_addr()?;
        let router = self.build_router();

        tracing::info!(
            "SimForge gateway starting on {} (provider: {}, model: {})",
            addr,
            self.state.engine.provider(),
            self.state.engine.model()
        );

        tracing::info!(
            "Schemas from {}, prompts from {}",
            self.state.schemas.root().display(),
            self.state.prompts.root().display()
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    async fn handle_health() -> impl IntoResponse {
        Json(ApiResponse::ok(
            json!({"status": "healthy", "version": VERSION}),
            "SimForge API is running",
        ))
    }

    async fn handle_generate(
        State(state): State<Arc<GatewayState>>,
        payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<GenerateResponse>>> {
        let Json(request) = payload.map_err(|e| GatewayError::Validation(e.body_text()))?;
        request.validate()?;

        tracing::info!(
            "Generation request received: n={}, temperature={}",
            request.n,
            request.temperature
        );
        let started = Instant::now();

        let outcome = state
            .engine
            .generator()
            .generate(
                &request.context,
                request.schema.as_ref(),
                request.n,
                request.temperature,
            )
            .await?;

        let total_generated = outcome.accepted.len();
        let sequences: Vec<_> = outcome
            .accepted
            .into_iter()
            .filter(|sequence| state.validator.validate_sequence(sequence))
            .collect();

        let metadata = GenerationMetadata {
            model: state.engine.model().to_string(),
            provider: state.engine.provider().to_string(),
            processing_time: started.elapsed().as_secs_f64(),
            temperature: request.temperature,
            total_generated,
            valid_sequences: sequences.len(),
            rejected: outcome.rejected,
        };
        let message = format!("Generated {} cognition sequences", sequences.len());

        Ok(Json(ApiResponse::ok(
            GenerateResponse {
                sequences,
                metadata,
            },
            message,
        )))
    }

    async fn handle_fork(
        State(state): State<Arc<GatewayState>>,
        payload: std::result::Result<Json<ForkRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<ForkResponse>>> {
        let Json(request) = payload.map_err(|e| GatewayError::Validation(e.body_text()))?;
        let fork_type = request.validate()?;

        tracing::info!(
            "Fork request received for row {} of sequence {}",
            request.row_id,
            request.sequence_id
        );
        let started = Instant::now();

        let outcome = state
            .engine
            .forker()
            .create_forks(
                &request.row,
                request.num_forks,
                fork_type,
                request.context.as_deref(),
            )
            .await?;

        let total_generated = outcome.accepted.len();
        let forks: Vec<_> = outcome
            .accepted
            .into_iter()
            .filter(|fork| state.validator.validate_step(fork))
            .collect();

        let metadata = ForkMetadata {
            model: state.engine.model().to_string(),
            provider: state.engine.provider().to_string(),
            processing_time: started.elapsed().as_secs_f64(),
            fork_type,
            sequence_id: request.sequence_id,
            parent_id: request.row_id,
            total_generated,
            valid_forks: forks.len(),
            rejected: outcome.rejected,
        };
        let message = format!("Generated {} forks", forks.len());

        Ok(Json(ApiResponse::ok(ForkResponse { forks, metadata }, message)))
    }

    async fn handle_list_schemas(
        State(state): State<Arc<GatewayState>>,
    ) -> Result<Json<ApiResponse<Value>>> {
        let schemas = state.schemas.list()?;
        let message = format!("Found {} schemas", schemas.len());
        Ok(Json(ApiResponse::ok(json!({ "schemas": schemas }), message)))
    }

    async fn handle_get_schema(
        State(state): State<Arc<GatewayState>>,
        Path(name): Path<String>,
    ) -> Result<Json<ApiResponse<Value>>> {
        let schema = state.schemas.get(&name)?;
        Ok(Json(ApiResponse::ok(schema, format!("Schema {} found", name))))
    }

    async fn handle_validate_schema(
        State(state): State<Arc<GatewayState>>,
        payload: std::result::Result<Json<SchemaValidationRequest>, JsonRejection>,
    ) -> Result<Json<ApiResponse<SchemaCheck>>> {
        let Json(request) = payload.map_err(|e| GatewayError::Validation(e.body_text()))?;
        let check = state
            .validator
            .validate_json_against_schema(&request.data, &request.schema);
        let message = if check.is_valid {
            "Data matches the schema".to_string()
        } else {
            format!("Data has {} schema errors", check.errors.len())
        };
        Ok(Json(ApiResponse::ok(check, message)))
    }

    async fn handle_list_prompts(
        State(state): State<Arc<GatewayState>>,
    ) -> Result<Json<ApiResponse<Value>>> {
        let prompts = state.prompts.list()?;
        let message = format!("Found {} prompts", prompts.len());
        Ok(Json(ApiResponse::ok(json!({ "prompts": prompts }), message)))
    }

    async fn handle_get_prompt(
        State(state): State<Arc<GatewayState>>,
        Path(name): Path<String>,
    ) -> Result<Json<ApiResponse<PromptFile>>> {
        let prompt = state.prompts.get(&name)?;
        Ok(Json(ApiResponse::ok(prompt, format!("Prompt {} found", name))))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Gateway shutdown initiated");
}
