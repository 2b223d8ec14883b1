use tasklist::config::Settings;
use tasklist::http::routing::{self, assets};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::from_env()?;
    if !settings.assets_dir.join("index.html").is_file() {
        tracing::warn!(dir = %settings.assets_dir.display(), "no index.html in assets directory");
    }
    let router = routing::app(assets::router(assets::AssetState { dir: settings.assets_dir.clone() }));

    let addr = settings.addr;
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
