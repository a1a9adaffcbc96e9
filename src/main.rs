use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use bucket_proxy::config;
use bucket_proxy::handler::{DispatchSettings, Dispatcher};
use bucket_proxy::storage::DriverRegistry;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bucket_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Register all storage driver factories / 注册所有存储驱动工厂
    let registry = DriverRegistry::new();
    bucket_proxy::register_storage_drivers(&registry).await;

    // Storage client is built once and shared by every invocation / 创建存储驱动
    let driver = registry
        .create_driver(&app_config.storage.driver, app_config.storage.driver_config())
        .await?;
    tracing::info!("Storage driver ready: {} (bucket {})", driver.name(), driver.bucket());

    let state = Arc::new(AppState {
        dispatcher: Dispatcher::new(driver, DispatchSettings::from_config(&app_config)),
        registry,
        config: app_config.clone(),
    });

    let app = api::create_router(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
