use anyhow::Result;
use clap::Parser;
use commander_ledger_server::config::ServerConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Commander Ledger HTTP service")]
struct Args {
    /// Config file path
    #[clap(short, long, env = "LEDGER_CONFIG")]
    config: Option<String>,

    /// Domain presets: development, production or testing
    #[clap(long, env = "LEDGER_PROFILE")]
    profile: Option<String>,

    /// Interface to bind
    #[clap(long)]
    host: Option<String>,

    /// TCP port to listen on
    #[clap(short, long, env = "PORT")]
    port: Option<u16>,

    /// Hosted backend project URL
    #[clap(long)]
    backend_url: Option<String>,

    /// Card data API base URL
    #[clap(long)]
    card_api_url: Option<String>,

    /// Default log filter
    #[clap(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = ServerConfig::load(args.config.as_deref(), args.profile.as_deref())?;

    // Override config with command-line arguments
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(backend_url) = args.backend_url {
        config.backend_url = backend_url;
    }
    if let Some(card_api_url) = args.card_api_url {
        config.card_api_url = card_api_url;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }
    config.validate()?;

    commander_ledger_server::init_tracing(&config.log_level);

    info!("Starting Commander Ledger service");
    info!("Hosted backend: {}", config.backend_url);
    if config.backfill_secret.is_none() {
        info!("Backfill endpoint disabled: no secret configured");
    }

    commander_ledger_server::serve(config).await
}
