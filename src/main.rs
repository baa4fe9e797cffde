use anyhow::Context;
use dynamodb_users::{
    api::{self, AppState},
    config::Config,
    server,
    store::dynamodb::DynamoStore,
    telemetry,
    users::UserRepository,
};
use std::{process, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("server encountered an error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    telemetry::init(config.log_level).context("failed to initialise logging")?;

    tracing::info!(endpoint = %config.dynamodb_endpoint, "connecting to DynamoDB");
    let store = DynamoStore::connect(&config.dynamodb_endpoint).await;
    let shutdown = CancellationToken::new();
    let state = AppState::new(UserRepository::new(Arc::new(store)), shutdown.clone());
    let app = api::router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(address = %listener.local_addr()?, "server listening");

    server::serve(
        listener,
        app,
        shutdown,
        config.shutdown_timeout(),
        server::shutdown_signal(),
    )
    .await?;
    Ok(())
}
