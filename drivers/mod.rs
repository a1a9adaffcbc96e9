// Driver package / 驱动包
pub mod s3;

use crate::storage::{DriverRegistry, MemoryDriverFactory};

/// Register all drivers to DriverRegistry / 注册所有驱动
pub async fn register_all(registry: &DriverRegistry) {
    // Register S3 driver / 注册S3对象存储驱动
    registry.register_factory(Box::new(s3::S3DriverFactory)).await;
    // Register in-memory driver (local runs and tests) / 注册内存驱动
    registry.register_factory(Box::new(MemoryDriverFactory)).await;
}
