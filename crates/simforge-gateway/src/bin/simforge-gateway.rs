//! SimForge Gateway Binary
//!
//! # Usage
//! ```bash
//! simforge-gateway [--config simforge.toml] [--port 12000] [--host 0.0.0.0] [--verbose]
//! ```
//!
//! Without `--config`, settings come from the environment (and `.env`).

use anyhow::Context;
use clap::Parser;
use simforge_gateway::{Gateway, GatewayConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SimForge Gateway - synthetic cognition trace generation over HTTP
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GatewayConfig::from_env().context("failed to read configuration from environment")?,
    };
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if config.engine.api_key.is_none() {
        config.engine.api_key = std::env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());
    }

    // RUST_LOG wins over the configured level
    let default_level = if args.verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(args.verbose)
        .with_thread_ids(args.verbose)
        .init();

    let gateway = Gateway::new(config.clone()).context("failed to initialize the engine")?;

    print_banner(&config);
    gateway.start().await?;

    Ok(())
}

fn print_banner(config: &GatewayConfig) {
    let prefix = config.normalized_prefix();
    println!();
    println!("SimForge Gateway v{}", simforge_gateway::VERSION);
    println!("  listening on http://{}:{}{}", config.host, config.port, prefix);
    println!("  provider {} / model {}", config.engine.provider, config.engine.model);
    println!();
    println!("  GET  {}/health", prefix);
    println!("  POST {}/cognition/generate", prefix);
    println!("  POST {}/cognition/fork", prefix);
    println!("  GET  {}/schemas[/:name]   POST {}/schemas/validate", prefix, prefix);
    println!("  GET  {}/prompts[/:name]", prefix);
    println!();
    println!("Press Ctrl+C to stop the gateway");
    println!();
}
