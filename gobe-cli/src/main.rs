//! gobe CLI - inspect settings files and check backend connectivity
//!
//! - `check`: connect to every configured backend and ping it
//! - `config`: print the parsed settings with secrets masked
//! - `code`: print a random numeric code

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gobe_core::config::{Connector, Settings};
use gobe_core::tracing_setup::{self, TracingConfig};
use gobe_core::util::{random_code, random_code_string, to_json};
use gobe_db::{ping_all, MongoConnector, OrmConnector, Ping, RedisClient, SqlConnector};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "gobe",
    author,
    version,
    about = "Settings and connection checks for SQL, MongoDB and Redis backends"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to every configured backend and ping it
    Check(ConfigArgs),
    /// Print the parsed settings as JSON with secrets masked
    Config(ConfigArgs),
    /// Print a random numeric code
    Code(CodeArgs),
}

#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Settings file (.toml, .yaml, .yml or .json)
    #[arg(long, short = 'c', default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(clap::Args, Debug)]
struct CodeArgs {
    /// Number of digits (clamped to 1..=19)
    #[arg(long, short = 'd', default_value_t = 6)]
    digits: u32,

    /// Allow leading zeros (string of independent digits)
    #[arg(long)]
    string: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = tracing_setup::init(&TracingConfig { debug: cli.debug }) {
        eprintln!("failed to initialize logging: {err:#}");
    }

    let result = match cli.command {
        Commands::Check(args) => run_check(&args).await,
        Commands::Config(args) => run_config(&args),
        Commands::Code(args) => {
            run_code(&args);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_config(args: &ConfigArgs) -> Result<()> {
    let settings = Settings::load(&args.config)?;
    println!("{}", to_json(&settings.redacted()));
    Ok(())
}

fn run_code(args: &CodeArgs) {
    if args.string {
        println!("{}", random_code_string(args.digits as usize));
    } else {
        println!("{}", random_code(args.digits));
    }
}

async fn run_check(args: &ConfigArgs) -> Result<()> {
    let settings = Settings::load(&args.config)?;

    let mut targets: Vec<Box<dyn Ping>> = Vec::new();

    if let Some(sql) = &settings.sql {
        let target: Box<dyn Ping> = match sql.connector {
            Connector::Sql => Box::new(
                SqlConnector::connect(sql)
                    .await
                    .context("SQL connection failed")?,
            ),
            Connector::Orm => Box::new(
                OrmConnector::connect(sql, &[])
                    .await
                    .context("ORM connection failed")?,
            ),
        };
        targets.push(target);
    }
    if let Some(mongo) = &settings.mongo {
        let connector = MongoConnector::connect(mongo)
            .await
            .context("MongoDB connection failed")?;
        targets.push(Box::new(connector));
    }
    if let Some(redis) = &settings.redis {
        let client = RedisClient::new(redis).context("invalid Redis settings")?;
        targets.push(Box::new(client));
    }

    if targets.is_empty() {
        anyhow::bail!("{} configures no backends", args.config.display());
    }

    let refs: Vec<&dyn Ping> = targets.iter().map(|t| &**t).collect();
    let failed: Vec<&str> = ping_all(&refs)
        .await
        .into_iter()
        .filter_map(|(name, result)| result.err().map(|_| name))
        .collect();

    if !failed.is_empty() {
        anyhow::bail!("unreachable: {}", failed.join(", "));
    }
    info!("{} backend(s) reachable", refs.len());
    Ok(())
}
