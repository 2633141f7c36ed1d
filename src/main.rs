use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::store::AppConfig;
use utils::Logger;

mod config;
mod llm;
mod loader;
mod movies;
mod server;
mod utils;

/// Movie-plot story chatbot backed by a vector database and a hosted LLM.
#[derive(Parser, Debug)]
#[command(name = "moviebot", version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Embed a JSON movie dataset and upsert it into the vector database
    Load {
        /// Path to a JSON array of movie records
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Logger::init(None);

    let cli = Cli::parse();
    let config = AppConfig::read(cli.config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run(config).await,
        Command::Load { file } => loader::run(config, &file).await,
    }
}
