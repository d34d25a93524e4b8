use clap::{Parser, Subcommand};
use incident_intel::commands::{ask, index_pdf, serve, show_status};
use incident_intel::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "incident-intel")]
#[command(about = "Question answering over uploaded PDF incident reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the server, Ollama and Gemini settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Start the HTTP API
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding the configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Index a local PDF, replacing the current index
    Index {
        /// Path to the PDF
        path: PathBuf,
    },
    /// Ask a question about the indexed document
    Ask {
        question: String,
        /// Number of chunks to use as context
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show the state of the index and external services
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Serve { host, port } => {
            serve(host, port).await?;
        }
        Commands::Index { path } => {
            index_pdf(&path).await?;
        }
        Commands::Ask { question, top_k } => {
            ask(question, top_k).await?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}
