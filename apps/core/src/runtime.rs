use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::catalog::{self, StoreError};
use crate::config::{self, ConfigError};
use crate::contract::PageResponse;
use crate::core_service::{SearchService, ServiceError};
use crate::dismissal::OutsideListeners;
use crate::navigation::StdoutNavigator;
use crate::session::Presentation;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Parser)]
#[command(name = "pixico-search", about = "Prompt and article search for the Pixico catalog")]
pub struct Cli {
    /// Config file (defaults to $PIXICO_CONFIG or the app data dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the catalog database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Import prompts and articles from a JSON5 seed file
    Seed { file: PathBuf },
    /// Run the search page query and print its JSON response
    Search { q: String },
    /// Run one suggestion round without debouncing
    Suggest { query: String },
    /// Drive a compact search session from stdin
    Interactive,
    /// Serve JSON-lines requests on stdin/stdout
    ServeStdio,
}

pub fn parse_cli_args(args: &[String]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("pixico-search".to_string()).chain(args.iter().cloned()))
}

pub async fn run_with_options(cli: Cli) -> Result<(), RuntimeError> {
    let mut config = config::load(cli.config.as_deref())?;
    if !config.config_path.exists() {
        config::save(&config)?;
        eprintln!(
            "[pixico-search] wrote default config to {}",
            config.config_path.display()
        );
    }
    if let Some(db) = cli.db {
        config.catalog_db_path = db;
    }

    if let Err(error) = crate::logging::init(&config.log_filter) {
        eprintln!("[pixico-search] logging disabled: {error}");
    }
    tracing::info!(
        config_path = %config.config_path.display(),
        catalog_db_path = %config.catalog_db_path.display(),
        "startup"
    );

    let service = SearchService::open(config)?;

    match cli.command {
        Command::Seed { file } => {
            let (prompts, articles) = service
                .source()
                .with_connection(|db| catalog::import_seed_file(db, &file))?;
            tracing::info!(prompts, articles, "seed imported");
            println!("imported prompts={prompts} articles={articles}");
        }
        Command::Search { q } => {
            let response = PageResponse::from(service.search_page(&q).await?);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Suggest { query } => {
            let response = PageResponse::from(service.suggest(&query).await?);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Interactive => run_interactive(&service).await?,
        Command::ServeStdio => serve_stdio(&service).await?,
    }
    Ok(())
}

async fn serve_stdio(service: &SearchService<catalog::SqliteCatalog>) -> Result<(), RuntimeError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut encoded = crate::transport::handle_json(service, &line).await;
        encoded.push('\n');
        stdout.write_all(encoded.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

async fn run_interactive(
    service: &SearchService<catalog::SqliteCatalog>,
) -> Result<(), RuntimeError> {
    let outside = OutsideListeners::default();
    let mut session = service.session(StdoutNavigator);
    session.attach_outside(&outside);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim_end() {
            ":submit" => {
                session.submit();
            }
            ":escape" => {
                session.escape();
            }
            ":focus" => {
                session.focus();
            }
            ":outside" => outside.pointer_down(false),
            command if command.starts_with(":select ") => {
                match command.trim_start_matches(":select ").trim().parse::<usize>() {
                    Ok(index) => {
                        if session.select(index).is_none() {
                            println!("no result at {index}");
                        }
                    }
                    Err(_) => println!("usage: :select N"),
                }
            }
            input => session.input(input),
        }

        session.settle().await;
        print_presentation(&session.presentation());
    }
    Ok(())
}

fn print_presentation(presentation: &Presentation) {
    match presentation {
        Presentation::Hidden => println!("(hidden)"),
        Presentation::Loading => println!("(loading)"),
        Presentation::Dropdown(entries) => {
            for (index, entry) in entries.iter().enumerate() {
                println!(
                    "{index}: [{}] {} -> {}",
                    entry.kind.as_str(),
                    entry.title,
                    entry.href
                );
            }
        }
    }
}
