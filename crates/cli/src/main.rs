use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "huddle", about = "Huddle — real-time location sharing and chat relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server.
    Gateway {
        /// Listen address; falls back to the config file.
        #[arg(long)]
        bind: Option<String>,
        /// Listen port; falls back to $PORT, then the config file.
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Print the resolved configuration.
    Config,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "huddle starting");

    match cli.command {
        Commands::Gateway { bind, port } => {
            let config = huddle_config::discover_and_load();
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let port = port.unwrap_or(config.server.port);
            huddle_gateway::server::start_gateway(&bind, port, &config).await
        },
        Commands::Config => {
            let config = huddle_config::discover_and_load();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        },
    }
}
