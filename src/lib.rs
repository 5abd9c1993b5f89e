//! # Tabload - CSV to PostgreSQL bulk import
//!
//! Tabload ingests arbitrary CSV files and materializes them as PostgreSQL
//! tables. The table schema is inferred from the file's header row at
//! upload time (one `TEXT` column per header cell, plus a generated `id`
//! identity column), and the data rows are bulk-inserted in a single
//! transaction: all of them commit, or none do.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌───────────────┐     ┌─────────────┐     ┌────────────┐
//! │  CSV File  │────▶│ Materializer  │────▶│ Bulk Loader │────▶│ PostgreSQL │
//! │ (uploaded) │     │ (drop+create) │     │  (one tx)   │     │   table    │
//! └────────────┘     └───────────────┘     └─────────────┘     └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabload::config::DbConfig;
//! use tabload::ingest::{self, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = tabload::db::connect(&DbConfig::from_env()?).await?;
//!     let spooled = ingest::spool_copy("people.csv".as_ref()).await?;
//!     let report = ingest::run(&pool, UploadRequest {
//!         file_path: spooled,
//!         table: "people".to_string(),
//!     }).await?;
//!     println!("Imported {} rows", report.rows_loaded);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment configuration
//! - [`db`] - PostgreSQL pool construction
//! - [`parser`] - Shared CSV decoding
//! - [`ingest`] - Schema materialization and bulk loading
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod db;
pub mod error;

// Parsing
pub mod parser;

// Ingest pipeline
pub mod ingest;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    CsvError,
    LoadError,
    PipelineError,
    SchemaError,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{DbConfig, ServerConfig};

// =============================================================================
// Re-exports - CSV Decoding
// =============================================================================

pub use parser::{read_header, read_rows};

// =============================================================================
// Re-exports - Ingest Pipeline
// =============================================================================

pub use ingest::{
    load,
    materialize,
    normalize_column,
    normalize_columns,
    run,
    LoadReport,
    UploadRequest,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, UploadResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
