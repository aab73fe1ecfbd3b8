// src/server/mod.rs

//! Development server: static files from the output root plus live reload.

pub mod livereload;

use std::path::Path;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::exec::ProgressReporter;
use crate::tasks::{BuildTask, TaskContext, TaskFuture, TaskReport};
use crate::types::TaskId;

pub use livereload::{inject_client, ReloadHub, ReloadSignal, CLIENT_SCRIPT, LIVERELOAD_PATH};

/// Largest HTML body the reload middleware will buffer.
const MAX_HTML_BYTES: usize = 16 * 1024 * 1024;

/// The long-lived dev server task.
///
/// Reports progress once its socket is bound; a bind failure is fatal to the
/// whole pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevServer;

impl BuildTask for DevServer {
    fn id(&self) -> TaskId {
        TaskId::DevServer
    }

    fn execute<'a>(&'a self, ctx: &'a TaskContext, progress: ProgressReporter) -> TaskFuture<'a> {
        Box::pin(async move {
            let addr = ctx.config().server().addr();
            let listener = TcpListener::bind(&addr)
                .await
                .map_err(|e| PipelineError::ServerStart(format!("binding {addr}: {e}")))?;
            let local = listener
                .local_addr()
                .map_err(|e| PipelineError::ServerStart(format!("reading bound address: {e}")))?;

            let root = &ctx.paths().output_root;
            info!(root = ?root, "dev server listening on http://{local}");
            println!("[assetflow] serving {} at http://{local}", root.display());

            progress.report().await;

            let app = router(root, ctx.reload().clone());
            axum::serve(listener, app.into_make_service())
                .await
                .map_err(|e| anyhow::anyhow!("dev server stopped: {e}"))?;

            Ok(TaskReport::default())
        })
    }
}

/// Routes: the SSE endpoint, then static files for everything else.
pub fn router(root: &Path, hub: ReloadHub) -> Router {
    Router::new()
        .route(LIVERELOAD_PATH, get(livereload::reload_events))
        .fallback_service(ServeDir::new(root))
        .layer(middleware::map_response(inject_reload_client))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}

async fn inject_reload_client(response: Response) -> Response {
    if response.status() != StatusCode::OK || !is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_HTML_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "failed to buffer html response for reload injection");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = String::from_utf8_lossy(&bytes);
    let injected = inject_client(&html);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(injected))
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}
