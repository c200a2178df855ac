use clap::Parser;
use responses_bridge::config::config_search_paths;
use responses_bridge::{build_router, AppState, ProxyConfig, ProxyMode, SharedLogger, Upstream};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "responses-bridge",
    about = "Serve Chat Completions style clients from the OpenAI Responses API",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// translate or passthrough (overrides config)
    #[arg(long)]
    mode: Option<ProxyMode>,

    /// Log file path
    #[arg(long, default_value = "responses-bridge.log")]
    log_file: PathBuf,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "responses_bridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = ProxyConfig::find_and_load(cli.config.as_deref())?;

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    let logger = SharedLogger::new(&cli.log_file)?;

    // The credential is read once here and handed to the upstream client.
    let api_key = config.resolve_api_key()?;
    let upstream = Upstream::from_config(&config.upstream, api_key)?;

    info!("responses-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("  Mode:      {}", config.mode);
    info!("  Upstream:  {}", config.upstream.url);
    info!("  Port:      {}", config.port);
    info!("  Log file:  {}", cli.log_file.display());

    logger.info(
        "startup",
        format!(
            "Starting responses-bridge mode={} upstream={} port={}",
            config.mode, config.upstream.url, config.port
        ),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        upstream,
        logger,
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}/api/openai", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
