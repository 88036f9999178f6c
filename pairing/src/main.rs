use clap::Parser;
use std::io::Write;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pairing",
    about = "Print the Wi-Fi pairing string for a WMR500 display unit",
    version
)]
struct Cli {
    /// Network name.
    #[arg(long, default_value = "SSID", env = "WIFI_SSID")]
    ssid: String,

    /// Network passphrase.
    #[arg(long, default_value = "PASSWORD", env = "WIFI_PASSWD", hide_env_values = true)]
    password: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pairing = pairing::pairing_string(&cli.ssid, &cli.password);

    if let Err(e) = writeln!(std::io::stdout().lock(), "{}", pairing) {
        error!("Failed to write pairing string: {}", e);
        std::process::exit(1);
    }
}
