//! Schema materialization: CSV header to destination table.
//!
//! The materializer reads only the header row, normalizes each cell into
//! a column name (whitespace runs become `_`, then lowercase), and
//! recreates the destination table: `DROP TABLE IF EXISTS` followed by
//! `CREATE TABLE` with an `id SERIAL PRIMARY KEY` identity column and one
//! `TEXT` column per header cell, in header order. Both statements run in
//! one transaction, so a failed create leaves any previous table intact.
//!
//! Caller-supplied table names are restricted to `[A-Za-z_][A-Za-z0-9_]*`;
//! column names come from file data and may contain anything that survives
//! normalization, so every identifier is double-quoted before it reaches
//! SQL text.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgPool;
use std::collections::HashSet;
use std::path::Path;

use crate::api::logs::{log_info, log_success};
use crate::error::{SchemaError, SchemaResult};
use crate::parser;

/// PostgreSQL truncates longer identifiers; reject instead of letting it.
const MAX_IDENTIFIER_BYTES: usize = 63;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Normalize one header cell into a column name.
///
/// Every maximal whitespace run becomes a single `_`, then the whole
/// name is lowercased. Leading and trailing runs are not special:
/// `" First Name"` becomes `"_first_name"`.
pub fn normalize_column(header: &str) -> String {
    WHITESPACE_RUN.replace_all(header, "_").to_lowercase()
}

/// Normalize a full header row into the ordered column list.
///
/// Order and count match the header. Rejected outright: cells that
/// normalize to nothing, to `id` (the identity column), to more than
/// [`MAX_IDENTIFIER_BYTES`], or to a name already taken by an earlier
/// cell.
pub fn normalize_columns(headers: &[String]) -> SchemaResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());

    for (index, header) in headers.iter().enumerate() {
        let column = normalize_column(header);
        if column.is_empty() {
            return Err(SchemaError::EmptyColumn(index + 1));
        }
        if column == "id" {
            return Err(SchemaError::ReservedColumn(header.clone()));
        }
        if column.len() > MAX_IDENTIFIER_BYTES {
            return Err(SchemaError::ColumnTooLong(column));
        }
        if !seen.insert(column.clone()) {
            return Err(SchemaError::DuplicateColumn(column));
        }
        columns.push(column);
    }

    Ok(columns)
}

/// Validate a caller-supplied destination table name.
pub fn validate_table_name(table: &str) -> SchemaResult<()> {
    if TABLE_NAME.is_match(table) && table.len() <= MAX_IDENTIFIER_BYTES {
        Ok(())
    } else {
        Err(SchemaError::InvalidTableName(table.to_string()))
    }
}

/// Double-quote an identifier for interpolation into SQL text.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

fn create_table_sql(table: &str, columns: &[String]) -> String {
    let column_defs: Vec<String> = columns
        .iter()
        .map(|column| format!("{} TEXT", quote_ident(column)))
        .collect();
    format!(
        "CREATE TABLE {} (id SERIAL PRIMARY KEY, {})",
        quote_ident(table),
        column_defs.join(", ")
    )
}

/// Materialize the destination table from a CSV file's header row.
///
/// Destructive: any existing table with this name is dropped first.
/// Returns the normalized column list, in header order, for the loader.
/// On failure the spooled file is left in place; only the loader owns
/// its removal.
pub async fn materialize(pool: &PgPool, path: &Path, table: &str) -> SchemaResult<Vec<String>> {
    validate_table_name(table)?;

    let headers = parser::read_header(path)?;
    let columns = normalize_columns(&headers)?;
    log_info(format!(
        "Materializing table '{}' with {} columns",
        table,
        columns.len()
    ));

    let mut tx = pool.begin().await?;
    sqlx::query(&drop_table_sql(table)).execute(&mut *tx).await?;
    sqlx::query(&create_table_sql(table, &columns))
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    log_success(format!("Table '{}' ready", table));
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column("First Name"), "first_name");
        assert_eq!(normalize_column("AGE"), "age");
        assert_eq!(normalize_column("already_clean"), "already_clean");
        // Runs collapse to a single underscore
        assert_eq!(normalize_column("a  \t b"), "a_b");
        // Leading and trailing runs are kept as underscores
        assert_eq!(normalize_column(" padded "), "_padded_");
        // Non-whitespace punctuation passes through
        assert_eq!(normalize_column("unit-price ($)"), "unit-price_($)");
    }

    #[test]
    fn test_normalize_columns_order_and_count() {
        let headers = vec![
            "First Name".to_string(),
            "Age".to_string(),
            "ZIP Code".to_string(),
        ];
        let columns = normalize_columns(&headers).unwrap();
        assert_eq!(columns, vec!["first_name", "age", "zip_code"]);
    }

    #[test]
    fn test_normalize_columns_rejects_duplicates() {
        let headers = vec!["First Name".to_string(), "first  name".to_string()];
        let err = normalize_columns(&headers).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn(ref c) if c == "first_name"));
    }

    #[test]
    fn test_normalize_columns_rejects_identity_collision() {
        let headers = vec!["name".to_string(), "ID".to_string()];
        let err = normalize_columns(&headers).unwrap_err();
        // The error names the original header cell, not the normalized form.
        assert!(matches!(err, SchemaError::ReservedColumn(ref h) if h == "ID"));

        // A padded variant normalizes to "_id_", which does not collide.
        let headers = vec![" ID ".to_string()];
        assert_eq!(normalize_columns(&headers).unwrap(), vec!["_id_"]);
    }

    #[test]
    fn test_normalize_columns_rejects_empty() {
        let headers = vec!["name".to_string(), "   ".to_string()];
        let err = normalize_columns(&headers).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyColumn(2)));
    }

    #[test]
    fn test_normalize_columns_rejects_overlong() {
        let headers = vec!["x".repeat(64)];
        let err = normalize_columns(&headers).unwrap_err();
        assert!(matches!(err, SchemaError::ColumnTooLong(_)));

        let headers = vec!["x".repeat(63)];
        assert!(normalize_columns(&headers).is_ok());
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("users").is_ok());
        assert!(validate_table_name("_staging_2024").is_ok());
        assert!(validate_table_name(&"t".repeat(63)).is_ok());

        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1users").is_err());
        assert!(validate_table_name("user data").is_err());
        assert!(validate_table_name("users; DROP TABLE users").is_err());
        assert!(validate_table_name("héros").is_err());
        assert!(validate_table_name(&"t".repeat(64)).is_err());
    }

    #[test]
    fn test_drop_table_sql() {
        assert_eq!(drop_table_sql("people"), "DROP TABLE IF EXISTS \"people\"");
    }

    #[test]
    fn test_create_table_sql() {
        let columns = vec!["first_name".to_string(), "age".to_string()];
        assert_eq!(
            create_table_sql("people", &columns),
            "CREATE TABLE \"people\" (id SERIAL PRIMARY KEY, \"first_name\" TEXT, \"age\" TEXT)"
        );
    }

    #[test]
    fn test_quote_ident_doubles_embedded_quotes() {
        // A column like this can only come from file data; quoting keeps it inert.
        assert_eq!(quote_ident("say\"hi"), "\"say\"\"hi\"");
        let sql = create_table_sql("t", &["x\"),(drop".to_string()]);
        assert!(sql.contains("\"x\"\"),(drop\""));
    }
}
