use anyhow::Context;

use cartlist_server::{api, build_state, init_tracing, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    let state = build_state(&config).await?;
    let router = api::app_router(state, &config);

    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("Failed to bind listen address")?;
    axum::serve(listener, router).await?;
    Ok(())
}
