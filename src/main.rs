use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use fedrank::config::Config;
use fedrank::logging;
use fedrank::pipeline::QueryRun;

#[derive(Parser)]
#[command(name = "fedrank", version, about = "Resource selection and results merging for federated search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query from a JSON document and print the outcome as JSON
    Run {
        /// Path to the query document, or "-" for stdin
        input: String,
        /// Search only this many of the best resources (overrides top_resources)
        #[arg(long)]
        top_resources: Option<usize>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read query from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read query file {}", input))
    }
}

fn main() -> Result<()> {
    // 1. Parse CLI args
    let cli = Cli::parse();

    // 2. Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });

    // 3. Initialize logging FIRST (before any other output)
    // CRITICAL: logging goes to stderr only, stdout carries the JSON result
    logging::init_logging(&config);

    // 4. Handle subcommands
    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Run { input, top_resources, pretty } => {
            if top_resources.is_some() {
                config.top_resources = top_resources;
            }
            let query = config.pipeline()?;

            let raw = read_input(&input)?;
            let run: QueryRun = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse query document {}", input))?;

            tracing::info!(
                selection = query.selection().method().name(),
                merging = query.merging().name(),
                "Running federated query"
            );
            let outcome = query.run(&run)?;

            let json = if pretty {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string(&outcome)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
