//! REST API types for the upload endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ingest::pipeline::LoadReport;

/// Response sent after a CSV has been imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Human-readable confirmation.
    pub message: String,

    /// Destination table.
    pub table: String,

    /// Normalized column names, in header order.
    pub columns: Vec<String>,

    /// Number of data rows committed.
    pub rows_loaded: usize,
}

impl From<LoadReport> for UploadResponse {
    fn from(report: LoadReport) -> Self {
        UploadResponse {
            message: "CSV imported successfully".to_string(),
            table: report.table,
            columns: report.columns,
            rows_loaded: report.rows_loaded,
        }
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({ "error": error })
}
