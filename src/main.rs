use clap::Parser;
use mcpfiles::{Config, McpError, Server, ensure_root, http_router};
use tracing_subscriber::EnvFilter;

fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.to_lowercase()));

    if cfg.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cfg: Config) -> Result<(), McpError> {
    ensure_root(&cfg.root)?;

    let srv = Server::builder(&cfg.root).build();
    let addr = cfg.bind_addr();
    tracing::info!(addr = %addr, root = %srv.root().display(), "starting server");

    let router = http_router(srv);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

#[tokio::main]
async fn main() {
    let cfg = Config::parse();
    init_tracing(&cfg);

    if let Err(e) = run(cfg).await {
        tracing::error!(error = %e, "fatal");
        std::process::exit(1);
    }
}
