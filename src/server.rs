//! HTTP service: the memorial endpoint, static uploads and a health route.
//!
//! ## Routes
//!
//! | Method | Path                          | Purpose                          |
//! |--------|-------------------------------|----------------------------------|
//! | GET    | `/`                           | liveness message                 |
//! | POST   | `/api/generate-memorial-pdf`  | render and download a memorial   |
//! | GET    | `/uploads/*`                  | photos under `<public>/uploads`  |
//!
//! Every route gets permissive CORS (the form is served from another
//! origin), request tracing, and a body limit.
//!
//! ## Client disconnects
//!
//! The handler attaches a fresh [`CancellationToken`] to each render and
//! holds its drop guard. If the client goes away, hyper drops the handler
//! future, the guard cancels the token, and the render thread stops at the
//! next page boundary instead of drawing a document nobody will receive.

use crate::config::{RenderConfig, ServerConfig};
use crate::error::MemorialError;
use crate::generate::generate;
use crate::model::DocumentRequest;
use crate::stream::pdf_byte_stream;
use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Liveness message returned by `GET /`.
pub const HEALTH_MESSAGE: &str = "Servidor Memorial PDF funcionando";

#[derive(Clone)]
struct AppState {
    render: Arc<RenderConfig>,
}

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        render: Arc::new(config.render.clone()),
    };

    let api = Router::new().route("/generate-memorial-pdf", post(generate_memorial_pdf));

    Router::new()
        .route("/", get(health))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(config.public_dir.join("uploads")))
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C (or SIGTERM on Unix).
pub async fn run_server(config: ServerConfig) -> Result<(), MemorialError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(MemorialError::Server)?;

    info!(
        "Memorial PDF server listening on {} (public dir: {})",
        addr,
        config.public_dir.display()
    );

    axum::serve(listener, router(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(MemorialError::Server)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": HEALTH_MESSAGE }))
}

async fn generate_memorial_pdf(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match DocumentRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected memorial request: {}", e);
            return e.into_response();
        }
    };

    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();
    let mut config = RenderConfig::clone(&state.render);
    config.cancellation = Some(token);

    match generate(request, &config).await {
        Ok(output) => {
            let filename = format!("memorial-{}.pdf", Utc::now().timestamp_millis());
            info!("Sending {} ({} bytes)", filename, output.pdf.len());
            (
                StatusCode::OK,
                [
                    (CONTENT_TYPE, "application/pdf".to_string()),
                    (CONTENT_DISPOSITION, format!("attachment; filename={filename}")),
                ],
                Body::from_stream(pdf_byte_stream(output.pdf)),
            )
                .into_response()
        }
        Err(e) => {
            error!("Error generating PDF: {}", e);
            e.into_response()
        }
    }
}

impl IntoResponse for MemorialError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            MemorialError::MissingEntries => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string() }),
            ),
            MemorialError::InvalidRequest(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Datos del memorial inválidos", "message": detail }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Error interno del servidor", "message": self.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
