//! HTTP server for CSV ingestion.
//!
//! # API Endpoints
//!
//! | Method | Path        | Description                          |
//! |--------|-------------|--------------------------------------|
//! | GET    | `/`         | Health check                         |
//! | GET    | `/health`   | Health check                         |
//! | POST   | `/upload`   | Upload a CSV and import it           |
//! | GET    | `/api/logs` | SSE stream for real-time logs        |
//!
//! `/upload` takes `multipart/form-data` with a `file` part (the CSV)
//! and a `tableName` text part. The payload is spooled to disk first;
//! the pipeline consumes the spooled file. Requests rejected before the
//! pipeline runs remove their own spool.

use axum::{
    extract::{Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::{
    convert::Infallible,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_warning, LOG_BROADCASTER};
use super::types::{error_response, UploadResponse};
use crate::ingest::pipeline::{self, UploadRequest};

/// Start the HTTP server
pub async fn start_server(pool: PgPool, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = router(pool).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 tabload server running on http://localhost:{}", port);
    println!("   POST /upload    - Upload CSV file");
    println!("   GET  /api/logs  - SSE log stream");
    println!("   GET  /health    - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(pool: PgPool) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .with_state(pool)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tabload",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /upload",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint
///
/// Every rejection before the pipeline takes over removes the spooled
/// file; from there on the loader owns removal.
async fn upload_csv(
    State(pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, Json<Value>)> {
    let mut spooled: Option<PathBuf> = None;
    let mut table_name: Option<String> = None;

    if let Err(reply) = collect_parts(&mut multipart, &mut spooled, &mut table_name).await {
        // The pipeline never saw the upload, so cleanup happens here.
        if let Some(path) = spooled.take() {
            discard_spool(&path).await;
        }
        return Err(reply);
    }

    let file_path = match spooled {
        Some(path) => path,
        None => return Err(bad_request("No file uploaded")),
    };
    let table = match table_name {
        Some(name) if !name.is_empty() => name,
        _ => {
            discard_spool(&file_path).await;
            return Err(bad_request("Table name is required"));
        }
    };

    let report = pipeline::run(&pool, UploadRequest { file_path, table })
        .await
        .map_err(|e| {
            log_error(format!("Import error: {}", e));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&e.to_string())),
            )
        })?;

    Ok(Json(UploadResponse::from(report)))
}

/// Pull the `file` and `tableName` parts out of the request, spooling
/// the file as soon as it arrives. A repeated `file` part replaces the
/// earlier spool.
async fn collect_parts(
    multipart: &mut Multipart,
    spooled: &mut Option<PathBuf>,
    table_name: &mut Option<String>,
) -> Result<(), (StatusCode, Json<Value>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?;
                if let Some(old) = spooled.take() {
                    discard_spool(&old).await;
                }
                let path = pipeline::spool_bytes(&bytes)
                    .await
                    .map_err(|e| internal_error(&format!("Could not spool upload: {}", e)))?;
                *spooled = Some(path);
            }
            "tableName" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?;
                *table_name = Some(value);
            }
            _ => {}
        }
    }

    Ok(())
}

/// Remove a spooled upload the pipeline will never consume.
async fn discard_spool(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        log_warning(format!(
            "Could not remove spooled file {}: {}",
            path.display(),
            e
        ));
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(error_response(message)))
}

fn internal_error(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error_response(message)),
    )
}
