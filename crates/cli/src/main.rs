mod auth_commands;
mod browse;

use {
    clap::{Parser, Subcommand},
    tonearm_config::Config,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "tonearm", about = "tonearm — music-streaming browser for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the YAML configuration file.
    #[arg(long, global = true, default_value = "config.yaml")]
    config: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive browsing session.
    Browse,
    /// Authentication management for the streaming account.
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // Logs go to stderr so the rendered pages own stdout.
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "tonearm starting");

    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Browse => browse::run(config).await,
        Commands::Auth { action } => auth_commands::handle_auth(action, &config).await,
    }
}
