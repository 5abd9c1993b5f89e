//! Tabload CLI - Import CSV files into PostgreSQL tables
//!
//! # Main Commands
//!
//! ```bash
//! tabload serve                          # Start HTTP server (PORT or 3000)
//! tabload load data.csv --table people   # One-shot import
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! tabload headers data.csv               # Show normalized column names
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabload::config::{DbConfig, ServerConfig};
use tabload::ingest::{self, UploadRequest};
use tabload::parser;

#[derive(Parser)]
#[command(name = "tabload")]
#[command(about = "Import CSV files into PostgreSQL tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Import a CSV file into a table
    Load {
        /// Input CSV file
        input: PathBuf,

        /// Destination table name
        #[arg(short, long)]
        table: String,
    },

    /// Show the normalized column names of a CSV file
    Headers {
        /// Input CSV file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Load { input, table } => cmd_load(&input, table).await,

        Commands::Headers { input } => cmd_headers(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = match port {
        Some(port) => port,
        None => ServerConfig::from_env()?.port,
    };

    let db = DbConfig::from_env()?;
    eprintln!("🔌 Connecting to {}:{}/{}", db.host, db.port, db.database);
    let pool = tabload::db::connect(&db).await?;

    tabload::server::start_server(pool, port).await
}

async fn cmd_load(input: &Path, table: String) -> Result<(), Box<dyn std::error::Error>> {
    let db = DbConfig::from_env()?;
    let pool = tabload::db::connect(&db).await?;

    eprintln!("📄 Importing: {} -> table '{}'", input.display(), table);

    // The pipeline consumes its input, so ingest a spooled copy and
    // leave the user's file alone.
    let spooled = ingest::spool_copy(input).await?;
    let report = ingest::run(
        &pool,
        UploadRequest {
            file_path: spooled,
            table,
        },
    )
    .await?;

    eprintln!(
        "✅ Imported {} rows into '{}'",
        report.rows_loaded, report.table
    );
    eprintln!("   Columns: {}", report.columns.join(", "));
    Ok(())
}

fn cmd_headers(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let headers = parser::read_header(input)?;
    let columns = ingest::normalize_columns(&headers)?;

    eprintln!("📄 {}: {} columns", input.display(), columns.len());
    for (original, normalized) in headers.iter().zip(&columns) {
        println!("{} -> {}", original, normalized);
    }
    Ok(())
}
