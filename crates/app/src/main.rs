mod command;
mod render;
mod repl;

use std::fmt;

use services::{ClientConfig, QuizClient};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --credentials-db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [--api-url <url>] [--credentials-db <sqlite_url>] [--timeout-secs <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url http://localhost:8000");
    eprintln!("  --credentials-db sqlite://quiz-credentials.sqlite3");
    eprintln!("  --timeout-secs 15");
    eprintln!();
    eprintln!("Environment (a .env file is read if present):");
    eprintln!("  QUIZ_API_URL, QUIZ_CREDENTIALS_DB, QUIZ_HTTP_TIMEOUT_SECS, RUST_LOG");
}

/// Apply command-line overrides on top of the environment.
fn parse_args(
    mut config: ClientConfig,
    args: &mut impl Iterator<Item = String>,
) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--api-url" => {
                let value = require_value(args, "--api-url")?;
                config = config.with_api_url(&value)?;
            }
            "--credentials-db" => {
                let value = require_value(args, "--credentials-db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value }.into());
                }
                config.credentials_db = value;
            }
            "--timeout-secs" => {
                let value = require_value(args, "--timeout-secs")?;
                config = config.with_timeout_secs(&value)?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg).into()),
        }
    }
    config.credentials_db = normalize_sqlite_url(config.credentials_db);
    Ok(config)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = ClientConfig::from_env()?;
    let mut args = std::env::args().skip(1);
    let config = parse_args(config, &mut args).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    init_tracing(&config.log_filter);
    tracing::debug!(api = %config.api_base_url, db = %config.credentials_db, "starting client");

    // Credentials live in a local SQLite file; create it before connecting.
    prepare_sqlite_file(&config.credentials_db)?;
    let client = QuizClient::from_config(&config).await?;
    if client.session().restore().await? {
        tracing::info!("resumed previous session");
    }

    repl::run(&client).await?;
    client.settle().await;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
