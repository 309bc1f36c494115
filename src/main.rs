use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orders_microservice::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    products::GrpcProductLookup,
    rpc,
    state::AppState,
    store::OrderStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,orders_microservice=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let conn = create_orm_conn(&config.database_url).await?;
    run_migrations(&conn, "migrations").await?;
    tracing::info!("database connected");

    let products = GrpcProductLookup::new(
        config.products_url.clone(),
        config.lookup_retry_attempts,
        Duration::from_millis(config.lookup_retry_delay_ms),
    );

    let state = AppState {
        store: OrderStore::new(conn),
        products: Arc::new(products),
        default_page_limit: config.default_page_limit,
    };

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("orders microservice listening on {}", addr);

    tonic::transport::Server::builder()
        .add_service(rpc::command_server(state))
        .serve(addr)
        .await?;

    Ok(())
}
