use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use anyhow::{anyhow, Result};
use serde_json::Value;

use super::{StorageDriver, DriverInfo};

pub type DriverBox = Arc<dyn StorageDriver>;

/// Driver factory trait / 驱动工厂 trait
pub trait DriverFactory: Send + Sync {
    /// Driver type name / 驱动类型名称
    fn driver_type(&self) -> &'static str;

    /// 创建驱动实例
    fn create_driver(&self, config: Value) -> Result<DriverBox>;

    /// Return driver description and config items / 返回驱动信息
    fn driver_info(&self) -> DriverInfo;
}

/// Driver registry (maps driver type to its factory) / 驱动注册表
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: Arc<RwLock<HashMap<String, Arc<Box<dyn DriverFactory>>>>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register driver factory / 注册驱动工厂
    pub async fn register_factory(&self, factory: Box<dyn DriverFactory>) {
        let driver_type = factory.driver_type().to_string();

        let mut factories = self.factories.write().await;
        factories.insert(driver_type.clone(), Arc::new(factory));

        tracing::info!("Driver factory registered: {}", driver_type);
    }

    /// Create driver instance / 创建驱动实例
    pub async fn create_driver(&self, driver_type: &str, config: Value) -> Result<DriverBox> {
        let factory = {
            let factories = self.factories.read().await;
            factories.get(driver_type)
                .cloned()
                .ok_or_else(|| anyhow!("Driver type not found: {}", driver_type))?
        };

        match factory.create_driver(config) {
            Ok(driver) => {
                tracing::info!("Driver created: {} (bucket {})", driver_type, driver.bucket());
                Ok(driver)
            }
            Err(e) => {
                tracing::error!("Driver creation failed: {} - {}", driver_type, e);
                Err(e)
            }
        }
    }

    /// List all available driver types / 列出所有可用的驱动类型
    pub async fn list_driver_types(&self) -> Vec<String> {
        let factories = self.factories.read().await;
        let mut types: Vec<String> = factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Get info of every registered driver / 获取所有驱动信息
    pub async fn list_driver_infos(&self) -> Vec<DriverInfo> {
        let factories = self.factories.read().await;
        let mut infos: Vec<DriverInfo> = factories.values().map(|f| f.driver_info()).collect();
        infos.sort_by(|a, b| a.driver_type.cmp(&b.driver_type));
        infos
    }
}
