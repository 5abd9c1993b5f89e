//! Upload ingest pipeline: materialize the table, then bulk-load the rows.
//!
//! The two stages share nothing but the spooled file path and the ordered
//! column list the materializer hands to the loader. There is no
//! cross-upload coordination: two concurrent ingests naming the same
//! table race on drop/create/insert, and the last materializer wins.
//! Callers that care must serialize per table name.

use serde::Serialize;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::api::logs::{log_info, log_success};
use crate::error::PipelineResult;
use crate::ingest::{loader, schema};

/// Directory where uploads are spooled before ingestion.
pub const SPOOL_DIR: &str = "uploads";

/// A CSV upload waiting to be ingested.
///
/// The file at `file_path` is consumed: the loader removes it once the
/// outcome is decided. Callers that want to keep their original file
/// should hand the pipeline a spooled copy (see [`spool_copy`]).
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Spooled CSV file.
    pub file_path: PathBuf,
    /// Destination table name.
    pub table: String,
}

/// Outcome of a completed ingest.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Destination table name.
    pub table: String,
    /// Normalized column names, in header order.
    pub columns: Vec<String>,
    /// Number of data rows committed.
    pub rows_loaded: usize,
}

/// Run the full ingest for one upload.
///
/// Materialization runs to completion before loading starts. A
/// materialization failure leaves the spooled file in place (the loader,
/// which owns removal, never ran); any loader exit removes it.
pub async fn run(pool: &PgPool, request: UploadRequest) -> PipelineResult<LoadReport> {
    log_info(format!(
        "Ingesting {} into table '{}'",
        request.file_path.display(),
        request.table
    ));

    let columns = schema::materialize(pool, &request.file_path, &request.table).await?;
    let rows_loaded = loader::load(pool, &request.file_path, &request.table, &columns).await?;

    log_success(format!(
        "Imported {} rows into '{}'",
        rows_loaded, request.table
    ));

    Ok(LoadReport {
        table: request.table,
        columns,
        rows_loaded,
    })
}

/// Spool raw upload bytes under a fresh name in [`SPOOL_DIR`].
pub async fn spool_bytes(bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = fresh_spool_path().await?;
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Copy an existing file into [`SPOOL_DIR`] under a fresh name.
///
/// The pipeline deletes its input, so one-shot callers ingest a copy and
/// keep their original.
pub async fn spool_copy(input: &Path) -> std::io::Result<PathBuf> {
    let path = fresh_spool_path().await?;
    tokio::fs::copy(input, &path).await?;
    Ok(path)
}

async fn fresh_spool_path() -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(SPOOL_DIR).await?;
    Ok(PathBuf::from(SPOOL_DIR).join(Uuid::new_v4().to_string()))
}
