//! MediRisk: heart-disease risk assessment.
//! Entry point for the command-line binary.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use medirisk_common::ModelKind;
use medirisk_scorer::ModelRegistry;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medirisk")]
#[command(about = "Heart disease risk assessment", version, long_about = None)]
struct Cli {
    /// Path to medirisk.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a raw record file and write the imputed dataset
    Preprocess {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score a patient read from a JSON file ("-" for stdin)
    Assess {
        #[arg(short, long, value_name = "PATH")]
        patient: PathBuf,
        /// logistic_regression, decision_tree or random_forest
        #[arg(short, long)]
        model: Option<ModelKind>,
    },
    /// List model artifacts and their training metrics
    Models,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = config::Config::load(cli.config.as_deref())?;

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("MediRisk {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Preprocess { input, output } => {
            let report = commands::preprocess(&config, input, output)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Assess { patient, model } => {
            let registry = ModelRegistry::init_global(&config.models.dir);
            let kind = model.unwrap_or(config.models.default);
            let patient = commands::read_patient(&patient)?;
            let assessment = commands::assess_patient(&registry, &patient, kind)?;
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Commands::Models => {
            let registry = ModelRegistry::init_global(&config.models.dir);
            let statuses = commands::model_statuses(&registry);
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
    }

    Ok(())
}
