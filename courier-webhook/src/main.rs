use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ax = courier_webhook::build().await?;

    let host = ax
        .app
        .get("http.host")
        .unwrap_or_else(|| "0.0.0.0".to_string());

    let port = ax
        .app
        .get("http.port")
        .unwrap_or_else(|| "3000".to_string());

    let addr = format!("{host}:{port}");

    tracing::info!(%addr, "courier webhook starting");

    ax.listen(addr).await?;

    Ok(())
}
