use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use umbra_ice::{IceConfig, IceCredentialResolver};
use umbra_ice_ureq_http_client::UreqHttpClient;

// Resolves TURN credentials the way call setup does and prints the ICE
// server list that would be handed to the WebRTC layer.
//
// Usage:
//   cargo run -- --relay wss://relay.umbra.app/ws
//   cargo run -- --turn-secret s3cr3t --turn-url turn:turn.umbra.app:3478
//   UMBRA_RELAY_URLS=wss://a/ws,wss://b/ws cargo run

#[derive(Parser, Debug)]
#[command(about = "Resolve TURN relay credentials and print the ICE server list")]
struct Args {
    /// Relay signaling URLs, tried in order.
    #[arg(long = "relay", env = "UMBRA_RELAY_URLS", value_delimiter = ',')]
    relays: Vec<String>,

    /// Shared TURN secret used when no relay answers.
    #[arg(long, env = "UMBRA_TURN_SECRET", hide_env_values = true)]
    turn_secret: Option<String>,

    /// TURN server URLs for the relay entry of the ICE server list.
    #[arg(long = "turn-url", env = "UMBRA_TURN_URLS", value_delimiter = ',')]
    turn_urls: Vec<String>,

    /// Per-relay request timeout in seconds.
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Allow ws:// and http:// relays (local development only).
    #[arg(long)]
    allow_plaintext_relays: bool,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let mut config = IceConfig::default()
        .with_relays(args.relays)
        .with_turn_urls(args.turn_urls)
        .with_fetch_timeout(Duration::from_secs(args.timeout_secs))
        .with_plaintext_relays(args.allow_plaintext_relays);
    if let Some(secret) = args.turn_secret {
        config = config.with_turn_secret(secret);
    }
    info!("Resolving with {:?}", config);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to build tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let http_client = Arc::new(UreqHttpClient::with_timeout(config.fetch_timeout));
        let resolver = IceCredentialResolver::with_system_clock(config, http_client);

        let servers = resolver.ice_servers().await;
        match serde_json::to_string_pretty(&servers) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to encode ICE servers: {}", e);
                std::process::exit(1);
            }
        }
    });
}
