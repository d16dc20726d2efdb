//! Wallmatch - match wall buildups against requirement profiles
//!
//! Headless command-line front end for the matching session: browse a catalog
//! category, inspect wall layers, and evaluate combinations against a
//! requirement profile with optional per-layer thickness ranges.
//!
//! # Usage
//!
//! ```bash
//! wallmatch products --type Aussenwand
//! wallmatch layers "Aussenwand 1.1"
//! wallmatch match "Aussenwand 1.1" --u-thresh 0.2 --range "Daemmung=120..160"
//! wallmatch match --all --json
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallmatch::cli::{
    CliResult, ConfigArgs, ExitCode, GlobalOptions, LayersArgs, MatchArgs, ProductsArgs,
    ProfilesArgs,
};

/// Wallmatch - match wall buildups against requirement profiles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Catalog service root URL (overrides the config file)
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the products of a category
    Products(ProductsArgs),
    /// Show the layers and variants of a wall
    Layers(LayersArgs),
    /// Match a wall (or all walls) against a requirement profile
    Match(MatchArgs),
    /// List saved requirement profiles
    Profiles(ProfilesArgs),
    /// Show or change configuration
    Config(ConfigArgs),
}

async fn run(cli: Cli) -> CliResult<()> {
    let global = GlobalOptions {
        api_url: cli.api_url,
    };
    match cli.command {
        Command::Products(args) => args.execute(&global).await,
        Command::Layers(args) => args.execute(&global).await,
        Command::Match(args) => args.execute(&global).await,
        Command::Profiles(args) => args.execute(),
        Command::Config(args) => args.execute(),
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so JSON output stays clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code().into()
        }
    }
}
