//! S3驱动工厂

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::storage::{DriverFactory, DriverInfo, ConfigItem, DriverBox};
use super::config::S3Config;
use super::driver::S3Driver;

/// S3驱动工厂
pub struct S3DriverFactory;

impl DriverFactory for S3DriverFactory {
    fn driver_type(&self) -> &'static str {
        "s3"
    }

    fn create_driver(&self, config: Value) -> Result<DriverBox> {
        let config: S3Config = serde_json::from_value(config)
            .map_err(|e| anyhow!("配置解析失败: {}", e))?;
        Ok(Arc::new(S3Driver::new(config)?))
    }

    fn driver_info(&self) -> DriverInfo {
        DriverInfo {
            driver_type: "s3".to_string(),
            display_name: "S3".to_string(),
            items: vec![
                ConfigItem::new("bucket", "string")
                    .title("存储桶名称")
                    .help("S3存储桶名称")
                    .required(),
                ConfigItem::new("endpoint", "string")
                    .title("端点地址")
                    .help("留空使用AWS区域端点；MinIO等填写完整URL"),
                ConfigItem::new("region", "string")
                    .title("区域")
                    .help("S3区域，如 us-east-1")
                    .default("us-east-1"),
                ConfigItem::new("access_key_id", "string")
                    .title("Access Key ID")
                    .help("留空则读取 AWS_ACCESS_KEY_ID 等环境变量"),
                ConfigItem::new("secret_access_key", "password")
                    .title("Secret Access Key"),
                ConfigItem::new("session_token", "password")
                    .title("Session Token")
                    .help("临时凭证的会话令牌（可选）"),
                ConfigItem::new("force_path_style", "bool")
                    .title("强制路径风格")
                    .help("MinIO等需要开启此选项")
                    .default("false"),
            ],
        }
    }
}
