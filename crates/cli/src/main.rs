use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    clap::Parser,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    websteer_agents::{AgentCoordinator, HttpEngine, ModelClientFactory},
    websteer_gateway::PerformService,
    websteer_session::SessionProvisioner,
    websteer_storage::{ArtifactPublisher, ObjectStore, S3Store},
};

#[derive(Parser)]
#[command(name = "websteer", about = "Websteer — browser automation runs as a service")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides the standard search locations).
    #[arg(long, env = "WEBSTEER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long)]
    port: Option<u16>,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
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

    info!(version = env!("CARGO_PKG_VERSION"), "websteer starting");

    // Config is read exactly once, here; components get their sections
    // through constructors and never touch the environment again.
    let mut config = match &cli.config {
        Some(path) => websteer_config::load_config(path)?,
        None => websteer_config::discover_and_load(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let store: Option<Arc<dyn ObjectStore>> = if config.storage.enabled() {
        Some(Arc::new(S3Store::connect(&config.storage).await?))
    } else {
        info!("no storage bucket configured, downloads resolve to local paths");
        None
    };

    let service = Arc::new(PerformService::new(
        SessionProvisioner::new(&config.provisioner, config.browser.clone()),
        ModelClientFactory::new(config.llm_gateway.clone()),
        AgentCoordinator::new(Arc::new(HttpEngine::new(&config.engine))),
        ArtifactPublisher::new(store, Duration::from_secs(config.storage.presign_ttl_secs)),
    ));

    websteer_gateway::serve(&config.server, service).await?;
    Ok(())
}
