//! Bulk loader: every data row into the destination table, one transaction.
//!
//! The loader re-reads the spooled CSV from the top, accumulates all data
//! rows in memory, and inserts them in file order with one parameterized
//! `INSERT` per row. The first failure rolls the whole transaction back;
//! a file with a header but no rows fails before any transaction is
//! opened. Whatever the outcome, the spooled file is removed exactly
//! once before the loader returns.

use csv::StringRecord;
use sqlx::{PgPool, Postgres, Transaction};
use std::path::Path;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{LoadError, LoadResult};
use crate::ingest::schema::quote_ident;
use crate::parser;

/// Load a CSV file's data rows into `table`.
///
/// `columns` is the normalized column list the materializer derived from
/// this same file; rows bind positionally against it (`$1..$n`). Returns
/// the number of rows committed.
///
/// The spooled file at `path` is removed on every exit path, success or
/// failure, after the outcome is decided.
pub async fn load(
    pool: &PgPool,
    path: &Path,
    table: &str,
    columns: &[String],
) -> LoadResult<usize> {
    let outcome = insert_rows(pool, path, table, columns).await;

    // Exactly one removal attempt per invocation, whatever the outcome.
    if let Err(e) = tokio::fs::remove_file(path).await {
        log_warning(format!(
            "Could not remove spooled file {}: {}",
            path.display(),
            e
        ));
    }

    outcome
}

async fn insert_rows(
    pool: &PgPool,
    path: &Path,
    table: &str,
    columns: &[String],
) -> LoadResult<usize> {
    let rows = parser::read_rows(path)?;
    if rows.is_empty() {
        return Err(LoadError::NoData);
    }

    log_info(format!("Loading {} rows into '{}'...", rows.len(), table));
    let sql = insert_sql(table, columns);

    let mut tx = pool.begin().await?;
    for (index, row) in rows.iter().enumerate() {
        if let Err(e) = check_row_shape(row, columns.len(), index + 1) {
            rollback_quietly(tx).await;
            return Err(e);
        }

        let mut insert = sqlx::query(&sql);
        for field in row.iter() {
            insert = insert.bind(field);
        }
        if let Err(e) = insert.execute(&mut *tx).await {
            rollback_quietly(tx).await;
            return Err(LoadError::Db(e));
        }
    }
    tx.commit().await?;

    log_success(format!("Committed {} rows", rows.len()));
    Ok(rows.len())
}

fn insert_sql(table: &str, columns: &[String]) -> String {
    let column_list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list.join(", "),
        placeholders.join(", ")
    )
}

fn check_row_shape(row: &StringRecord, expected: usize, row_number: usize) -> LoadResult<()> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(LoadError::RowShape {
            row: row_number,
            expected,
            found: row.len(),
        })
    }
}

/// Roll back without masking the error that got us here.
async fn rollback_quietly(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        log_warning(format!("Rollback failed: {}", e));
    }
}
