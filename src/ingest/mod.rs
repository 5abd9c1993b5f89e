//! Ingest module.
//!
//! CSV upload to relational table, in two stages:
//! - Schema: header normalization and destination table materialization
//! - Loader: transactional bulk insert of the data rows
//! - Pipeline: materialize-then-load orchestration and upload spooling

pub mod loader;
pub mod pipeline;
pub mod schema;

pub use loader::load;
pub use pipeline::{run, spool_bytes, spool_copy, LoadReport, UploadRequest, SPOOL_DIR};
pub use schema::{materialize, normalize_column, normalize_columns, validate_table_name};
