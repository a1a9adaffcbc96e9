use async_trait::async_trait;
use anyhow::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Configuration item definition / 配置项定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    /// Display title (friendly name) / 显示标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ConfigItem {
    pub fn new(name: &str, item_type: &str) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            item_type: item_type.to_string(),
            default: None,
            required: false,
            help: None,
        }
    }

    pub fn title(mut self, val: &str) -> Self {
        self.title = Some(val.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, val: &str) -> Self {
        self.default = Some(val.to_string());
        self
    }

    pub fn help(mut self, val: &str) -> Self {
        self.help = Some(val.to_string());
        self
    }
}

/// Complete driver information / 驱动完整信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_type: String,
    pub display_name: String,
    /// Driver-specific configuration items / 驱动特有配置项
    pub items: Vec<ConfigItem>,
}

/// Presigned GET options / 预签名下载参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Link lifetime in seconds / 链接有效期（秒）
    pub expire_secs: u32,
    /// Forced `Content-Type` of the download response / 强制下载响应类型
    pub content_type: Option<String>,
}

/// Object storage driver interface (one call per primitive) / 对象存储驱动接口
///
/// Every method maps to exactly one request against the backing bucket, so a
/// failed call never leaves more than that one request applied.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Driver name / 驱动名称
    fn name(&self) -> &str;

    /// Bucket this driver is bound to / 存储桶名称
    fn bucket(&self) -> &str;

    /// List every object key, in the order the backend returns them / 列出所有对象键
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Write an object, replacing whatever is stored at `key` / 写入对象（覆盖）
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Issue a time-limited GET link for `key` / 生成预签名下载链接
    /// The object is not required to exist.
    async fn presign_get(&self, key: &str, options: &LinkOptions) -> Result<String>;

    /// Delete an object; missing keys are not an error / 删除对象
    async fn delete(&self, key: &str) -> Result<()>;
}

pub mod manager;
pub mod memory;

pub use manager::{DriverRegistry, DriverFactory, DriverBox};
pub use memory::{MemoryDriver, MemoryDriverFactory};
