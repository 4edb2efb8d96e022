use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use hato::config::{Config, Secrets};
use hato::pipeline::Gateway;
use hato::server::GatewayServer;

/// Hato - image fetch-and-encode gateway for LINE, Chatwork and direct URLs
#[derive(Parser, Debug)]
#[command(name = "hato")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration before logging so the logging section applies
    let mut config = Config::load(&args.config)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().map_err(anyhow::Error::msg).context("Invalid configuration")?;

    hato::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to initialize logging subsystem")?;

    let secrets = Secrets::from_env();

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        auth_configured = secrets.internal_auth_token.is_some(),
        line_token_configured = secrets.line_access_token.is_some(),
        chatwork_token_configured = secrets.chatwork_api_token.is_some(),
        "Configuration loaded successfully"
    );

    if args.test {
        tracing::info!("Configuration test successful");
        return Ok(());
    }

    let gateway = Arc::new(Gateway::new(&config, secrets).context("Failed to build gateway")?);
    let server = GatewayServer::bind(&config.server, gateway)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr()))?;

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}
