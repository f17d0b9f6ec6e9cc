use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use graceful::adapters::{HyperServer, SignalTrigger, StaticResponder};
use graceful::domain::{GracefulError, Result, ServerConfig};

#[derive(Parser, Debug)]
#[clap(version = env!("GRACEFUL_VERSION"))]
pub struct Opts {
    /// Configuration file, defaults to the user configuration directory
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// listen on this network address (empty for the default HTTP port)
    #[clap(long, short = 'b')]
    bind: Option<String>,

    /// milliseconds to wait for in-flight requests on shutdown, 0 waits forever
    #[clap(long, short = 't')]
    timeout_ms: Option<u64>,

    /// delay every response by this many milliseconds
    #[clap(long)]
    delay_ms: Option<u64>,

    /// only shut down on SIGINT
    #[clap(long)]
    ignore_sigterm: bool,
}

fn load_config(opts: &Opts) -> Result<ServerConfig> {
    let loaded: std::result::Result<ServerConfig, confy::ConfyError> = match &opts.config {
        Some(path) => confy::load_path(path),
        None => confy::load("graceful", None),
    };
    let mut config = loaded.map_err(|e| GracefulError::Config(e.to_string()))?;

    if let Some(bind) = &opts.bind {
        config.bind = bind.clone();
    }
    if let Some(timeout_ms) = opts.timeout_ms {
        config.drain_timeout_ms = timeout_ms;
    }
    if let Some(delay_ms) = opts.delay_ms {
        config.response_delay_ms = delay_ms;
    }
    if opts.ignore_sigterm {
        config.handle_sigterm = false;
    }
    Ok(config)
}

async fn start(opts: Opts) -> Result<()> {
    let config = load_config(&opts)?;
    info!(
        bind = %config.bind,
        drain_timeout_ms = config.drain_timeout_ms,
        "Starting graceful {}",
        env!("GRACEFUL_VERSION")
    );

    let handler = Arc::new(StaticResponder::new(config.response_body.clone(), config.response_delay()));
    let server = Arc::new(HyperServer::bind(&config.bind, handler).await?);
    let trigger = SignalTrigger::new(config.handle_sigterm)?;

    graceful::serve(server, config.drain_timeout(), Box::new(trigger)).await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match start(Opts::parse()).await {
        Ok(()) => info!("Stopped"),
        Err(e) if e.is_server_closed() => info!("Shutdown complete"),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
