use anyhow::Result;
use flux_blob::{env_var_or, FluxAdapter, FluxConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = FluxConfig::from_env();
    let adapter = FluxAdapter::local(config).await?;
    tracing::info!(
        upload_dir = %adapter.config().upload_dir.display(),
        serialize_per_upload = adapter.config().serialize_per_upload,
        "chunk store ready"
    );

    let host = env_var_or("FLUX_HTTP_HOST", "127.0.0.1".to_string());
    let port: u16 = env_var_or("FLUX_HTTP_PORT", 3030);
    let addr = format!("{host}:{port}");

    flux_axum::axum(adapter).listen(addr).await?;

    Ok(())
}
