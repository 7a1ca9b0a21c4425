// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The GeoMark www API
//!

use clap::Parser;
use geomark_crud::{db_url_from_path, setup_database_at_path};
use geomark_www_api::prepare_api_router;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

/// GeoMark www API entry point (serve the www JSON API)
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    // Setup logging
    let config_log = ConfigBuilder::new().add_filter_allow_str("geomark").build();
    TermLogger::init(
        LevelFilter::Info,
        config_log,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    // Ensure the database exists and is migrated before serving
    setup_database_at_path(&args.database).await?;

    serve(
        &db_url_from_path(&args.database),
        args.port,
        &args.token_secret,
    )
    .await
}

/// Serve the API
async fn serve(
    db_url: &str,
    port: u16,
    token_secret: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let api_router = prepare_api_router(db_url, token_secret).await?;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("http://{addr}");

    axum::serve(listener, api_router).await?;
    Ok(())
}

/// GeoMark CLI args using [clap]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "GeoMark www API server",
    after_help = "This is intended for use when deploying to a server and in CI"
)]
pub struct Cli {
    /// Path to the database
    #[arg(long)]
    pub database: PathBuf,

    /// Port to listen on
    #[arg(long, default_value_t = 2408)]
    pub port: u16,

    /// Secret used to sign bearer tokens.  Every instance sharing a
    /// database must share this secret.
    #[arg(long)]
    pub token_secret: String,
}
