use clap::Parser;
use timeserver::config::Cli;
use timeserver::{metrics, poller, rest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let server_config = cli.server_config();
    let poller_config = match cli.poller_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting WMR500 time server");
    info!(
        "HTTP{}: {}, offset suffix: {:?}",
        if server_config.tls.is_some() { "S" } else { "" },
        server_config.bind_addr,
        server_config.offset_suffix
    );

    if let Err(e) = metrics::init_metrics() {
        error!("Failed to register metrics: {}", e);
        std::process::exit(1);
    }

    let server_handle = tokio::spawn(async move {
        if let Err(e) = rest::run_http(server_config).await {
            error!("HTTP server error: {}", e);
        }
    });

    // The poller runs next to the server, never after it.
    let poller_handle = match poller_config {
        Some(config) => {
            info!("Status poller: {:?}", config);
            tokio::spawn(poller::run_poller(config))
        }
        None => {
            info!("No MQTT broker configured, status poller disabled");
            tokio::spawn(std::future::pending())
        }
    };

    tokio::select! {
        _ = server_handle => {
            error!("HTTP server terminated");
            std::process::exit(1);
        }
        _ = poller_handle => {
            error!("Status poller terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
}
