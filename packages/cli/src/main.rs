#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for extracting planning applications from saved eTrack
//! result pages.
//!
//! Pages are read from disk; fetching them (and replaying the postbacks
//! this tool prints) is up to whatever HTTP client drives the portal.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use etrack::{Document, NavigationAction, PortalConfig, fields, pager};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "etrack", about = "eTrack result page extraction tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from saved result pages, one JSON object per line
    Parse {
        /// HTML files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// URL the pages were served from (used to resolve detail links)
        #[arg(long)]
        base_url: String,
        /// Portal configuration TOML file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Guest session marker (overrides the config file)
        #[arg(long)]
        webguest: Option<String>,
    },
    /// Print the pager state and next-page action of a saved result page
    Pager {
        /// HTML file to read
        file: PathBuf,
        /// URL the page was served from
        #[arg(long)]
        base_url: String,
    },
    /// List every recognised column header and the field it maps to
    Fields,
}

/// Pager summary printed by the `pager` subcommand.
#[derive(Serialize)]
struct PagerReport {
    current_page: u32,
    next: Option<NavigationAction>,
}

fn load_document(path: &Path, base_url: &str) -> Result<Document, Box<dyn std::error::Error>> {
    let body = std::fs::read_to_string(path)?;
    Ok(Document::parse(&body, base_url)?)
}

fn load_config(
    path: Option<&Path>,
    webguest: Option<&str>,
) -> Result<PortalConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => PortalConfig::from_toml(&std::fs::read_to_string(path)?)?,
        None => PortalConfig::default(),
    };

    Ok(match webguest {
        Some(webguest) => config.with_webguest(webguest),
        None => config,
    })
}

fn parse_pages(
    files: &[PathBuf],
    base_url: &str,
    config: &PortalConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut total = 0;

    for file in files {
        log::info!("Reading {}", file.display());
        let doc = load_document(file, base_url)?;

        let mut write_err = None;
        total += etrack::scrape(&doc, config, |record| {
            if write_err.is_none()
                && let Err(e) = serde_json::to_writer(&mut out, &record)
                    .map_err(std::io::Error::from)
                    .and_then(|()| writeln!(out))
            {
                write_err = Some(e);
            }
        })?;
        if let Some(e) = write_err {
            return Err(e.into());
        }

        match pager::advance(&doc) {
            Ok(Some(action)) => log::info!("{}: next page via {action:?}", file.display()),
            Ok(None) => log::info!("{}: last page", file.display()),
            Err(e) => log::debug!("{}: no pagination ({e})", file.display()),
        }
    }

    log::info!("Extracted {total} record(s) from {} page(s)", files.len());
    Ok(())
}

fn print_pager(file: &Path, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(file, base_url)?;
    let report = PagerReport {
        current_page: pager::current_page_number(&doc)?,
        next: pager::advance(&doc)?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_fields() {
    for (header, field) in fields::known_headers() {
        println!("{header}\t{field}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            files,
            base_url,
            config,
            webguest,
        } => {
            let config = load_config(config.as_deref(), webguest.as_deref())?;
            parse_pages(&files, &base_url, &config)?;
        }
        Commands::Pager { file, base_url } => print_pager(&file, &base_url)?,
        Commands::Fields => print_fields(),
    }

    Ok(())
}
