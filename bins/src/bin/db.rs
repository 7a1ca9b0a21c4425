// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider GeoMark project*
//!
//! Basic database management for GeoMark marker stores
//!

use clap::{CommandFactory, Parser, ValueEnum, builder::PossibleValue};
use geomark_crud::{FetchAll, MarkerTypes, db_url_from_path};
use sqlx::SqlitePool;
use std::path::PathBuf;

/// GeoMark database tool entry point
///
/// One of:
/// - Create (and migrate) a database
/// - List the seeded marker types
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    match &args.cli_command {
        //----------------------------------------------------------------------
        // Valid
        //----------------------------------------------------------------------
        Command::Create => match geomark_crud::setup_database_at_path(&args.database).await {
            Ok(_pool) => println!("Success"),
            Err(error) => {
                eprintln!("Error: {error}");
                std::process::exit(1);
            }
        },
        Command::Types => {
            let db_url = db_url_from_path(&args.database);
            let pool = match SqlitePool::connect(&db_url).await {
                Ok(pool) => pool,
                Err(error) => {
                    eprintln!("Error connecting to database: {error}");
                    std::process::exit(1);
                }
            };

            let mut transaction = pool.begin().await?;
            match MarkerTypes::fetch_all(&mut transaction).await {
                Ok(types) => {
                    for marker_type in &types {
                        println!(
                            "{}  {}",
                            marker_type.type_id.map(|id| id.to_string()).unwrap_or_default(),
                            marker_type.name
                        );
                    }
                }
                Err(error) => {
                    eprintln!("Error fetching marker types: {error}");
                    std::process::exit(1);
                }
            }
        }
        //----------------------------------------------------------------------
        // Invalid
        //----------------------------------------------------------------------
        #[allow(unreachable_patterns)]
        _ => {
            eprintln!("CLI Error: invalid options");
            Cli::command().print_long_help().unwrap();
            std::process::exit(1);
        }
    }

    Ok(())
}

/// GeoMark CLI args using [clap]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "GeoMark tool for basic database management",
    after_help = "This is intended for use when deploying to a server and in CI"
)]
pub struct Cli {
    // Database command
    #[arg(value_enum)]
    pub cli_command: Command,

    /// Path to the database
    #[arg(long)]
    pub database: PathBuf,
}

#[derive(Debug, Clone)]
pub enum Command {
    Create,
    Types,
}

impl ValueEnum for Command {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Create, Self::Types]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match self {
            Command::Create => Some(
                PossibleValue::new("create")
                    .help("Create a new, migrated database at the path"),
            ),
            Command::Types => Some(
                PossibleValue::new("types").help("List the marker types in the database"),
            ),
        }
    }
}
