//! pulse service binary

use clap::{Parser, Subcommand};
use pulse::{Server, ServiceConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pulsed")]
#[command(about = "Liveness service with exactly-once HTTP request logging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address
        #[arg(long)]
        bind: Option<String>,

        /// Config file (TOML); defaults to ./pulse.toml if present
        #[arg(long)]
        config: Option<String>,

        /// Path prefixes to skip instrumentation for (comma-separated)
        #[arg(long, value_delimiter = ',')]
        skip_prefix: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            config,
            skip_prefix,
        } => {
            // File/env config first, CLI flags override
            let mut service_config = ServiceConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                service_config.bind_addr = bind.parse()?;
            }
            if !skip_prefix.is_empty() {
                service_config.logging.skip_prefixes = skip_prefix;
            }
            service_config.validate()?;

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| {
                            tracing_subscriber::EnvFilter::new(&service_config.log_level)
                        }),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            let server = Server::new(service_config);
            server.serve().await?;
        }
    }

    Ok(())
}
