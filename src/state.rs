use bucket_proxy::config::AppConfig;
use bucket_proxy::handler::Dispatcher;
use bucket_proxy::storage::DriverRegistry;

/// Shared application state / 应用共享状态
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub registry: DriverRegistry,
    pub config: AppConfig,
}
