//! netlb agent CLI
//!
//! Reads commands as JSON, runs them against the configured network
//! controller and prints the answer as JSON. Exit status mirrors the
//! answer's result flag so scripts can chain on it.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use netlb_client::NetworkApiConfig;
use netlb_converge::NetworkResource;
use netlb_shared_types::NetworkCommand;

#[derive(Parser)]
#[command(name = "netlb-agent")]
#[command(about = "Network load-balancer convergence agent")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Agent configuration file path
    #[arg(short, long, default_value = "/etc/netlb/agent.json")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one command from a JSON file
    Execute {
        /// Command file path
        file: PathBuf,
    },

    /// Validate the agent configuration file
    ValidateConfig,
}

#[derive(Debug, Deserialize)]
struct AgentConfig {
    controller: NetworkApiConfig,
    /// Pre-registered controller-side healthcheck id for this
    /// deployment.
    healthcheck_id: i64,
}

fn load_config(path: &PathBuf) -> anyhow::Result<AgentConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: AgentConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.controller.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::ValidateConfig => {
            println!("configuration {} is valid", cli.config.display());
        }
        Commands::Execute { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read command file {}", file.display()))?;
            let command: NetworkCommand = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse command file {}", file.display()))?;

            let resource = NetworkResource::new(&config.controller, config.healthcheck_id)?;
            let answer = resource.execute(command).await;
            println!("{}", serde_json::to_string_pretty(&answer)?);

            if !answer.result {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
