mod app;
mod doctor_cmd;
mod ocr_cmd;
mod serve_cmd;
mod status_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use llamaocr_config::{
    defaults::DEFAULT_PORT, load_and_prepare, resolve_config_path, with_server_overrides,
};

#[derive(Parser)]
#[command(name = "llamaocr")]
#[command(about = "LlamaOCR — local OCR and Q&A with a vision model")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.llamaocr/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind the HTTP server to
        #[arg(long)]
        bind: Option<String>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Transcribe a local image and optionally ask questions about it
    Ocr {
        /// Image file (jpg, jpeg, png or gif)
        image: PathBuf,
        /// Follow-up question; may be repeated
        #[arg(short, long = "question")]
        questions: Vec<String>,
    },
    /// Check that the model endpoint is reachable and the model is installed
    Doctor,
    /// Query the health endpoint of a running server
    Status {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Serve { bind, port } => {
            let config = load_and_prepare(&config_path).await?;
            let config = with_server_overrides(config, bind, port)?;
            app::init_logging(&config);
            serve_cmd::run(config).await?;
        }
        Commands::Ocr { image, questions } => {
            let config = load_and_prepare(&config_path).await?;
            app::init_logging(&config);
            ocr_cmd::run(&config, &image, &questions).await?;
        }
        Commands::Doctor => {
            let config = load_and_prepare(&config_path).await?;
            app::init_logging(&config);
            doctor_cmd::run(&config).await?;
        }
        Commands::Status { port } => {
            // A broken config should not stop a status probe.
            let configured = load_and_prepare(&config_path)
                .await
                .map(|c| c.server.port)
                .unwrap_or(DEFAULT_PORT);
            status_cmd::run(port.unwrap_or(configured)).await?;
        }
    }

    Ok(())
}
