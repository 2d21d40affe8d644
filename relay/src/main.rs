use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use tracing::info;

use audiows_relay::{
    AppError, ApplicationRegistry, AudioWsApp, RelayConfig, StdioCallLeg,
    core::relay::RelayMode,
    utils::validate_ws_url,
};

/// AudioWS relay - streams call audio to a WebSocket and plays back the replies
///
/// Raw audio frames are read from stdin and written to the WebSocket as
/// binary messages; binary messages from the WebSocket are written to stdout.
#[derive(Parser, Debug)]
#[command(name = "audiows-relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// WebSocket URL (overrides relay.url)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    url: Option<String>,

    /// Relay mode: lock-step or pipelined
    #[arg(short = 'm', long = "mode", value_parser = parse_mode)]
    mode: Option<RelayMode>,

    /// DTMF digit that ends the session
    #[arg(long = "hangup-digit", value_parser = parse_hangup_digit)]
    hangup_digit: Option<char>,
}

fn parse_mode(raw: &str) -> Result<RelayMode, String> {
    RelayMode::parse(raw).ok_or_else(|| format!("'{raw}' is not lock-step or pipelined"))
}

fn parse_hangup_digit(raw: &str) -> Result<char, String> {
    audiows_relay::core::leg::parse_digit(raw)
        .ok_or_else(|| format!("'{raw}' is not a DTMF digit"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // stdout carries audio, so logs go to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    // Load configuration from file or environment
    let mut config = if let Some(config_path) = cli.config {
        info!("Loading configuration from {}", config_path.display());
        RelayConfig::from_file(&config_path).map_err(AppError::from)?
    } else {
        RelayConfig::from_env().map_err(AppError::from)?
    };

    if let Some(url) = cli.url {
        validate_ws_url(&url)?;
        config.url = Some(url);
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(digit) = cli.hangup_digit {
        config.hangup_digit = digit;
    }

    let app_name = config.app_name.clone();
    let args = config.url.clone().unwrap_or_default();
    let leg = StdioCallLeg::new(tokio::io::stdin(), tokio::io::stdout(), config.frame_bytes);

    let registry = ApplicationRegistry::new();
    registry.register(Arc::new(AudioWsApp::new(config)))?;

    let status = registry.invoke(&app_name, &args, Box::new(leg)).await;

    registry.unregister_all();
    info!(status, "Relay exited");

    std::process::exit(status);
}
