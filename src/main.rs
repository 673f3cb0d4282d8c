use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// irilabs - iri-labs.com website
#[derive(Parser)]
#[command(name = "irilabs")]
#[command(about = "Serves the iri-labs.com pages and contact form", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,

        /// Site root holding letter.pdf and the contact log (overrides config file)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = irilabs::config::Config::load(cli.config)?;

    irilabs::observability::init_observability(
        "irilabs",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port, root } => {
            if let Some(root) = root {
                config.site.root = root;
            }

            config.validate().map_err(|e| anyhow::anyhow!(e))?;

            irilabs::server::serve(config, host, port).await
        }
    }
}
