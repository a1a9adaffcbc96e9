//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::drivers::s3::S3Config;
use crate::storage::LinkOptions;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration / 存储配置
    #[serde(default)]
    pub storage: StorageConfig,
    /// Download link configuration / 下载链接配置
    #[serde(default)]
    pub link: LinkConfig,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Storage configuration / 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Driver type ("s3" or "memory") / 驱动类型
    pub driver: String,
    /// Bucket name / 存储桶名称
    pub bucket: String,
    /// Region / 区域
    pub region: String,
    /// Custom endpoint, empty for AWS / 自定义端点
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: String,
    #[serde(default)]
    pub force_path_style: bool,
    /// Public host used in upload URLs (CDN), empty for the bucket's S3 host / 自定义公开域名
    #[serde(default)]
    pub public_host: String,
}

/// Download link configuration / 下载链接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Presigned URL lifetime (seconds) / 预签名URL过期时间（秒）
    pub expire_secs: u32,
    /// Forced response content type, empty keeps the stored type / 强制响应类型
    pub content_type: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8180,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: "s3".to_string(),
            bucket: "mownika-poc-s3".to_string(),
            region: "us-east-1".to_string(),
            endpoint: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: String::new(),
            force_path_style: false,
            public_host: String::new(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            expire_secs: 300,
            content_type: "application/octet-stream".to_string(),
        }
    }
}

impl StorageConfig {
    /// Build the driver config value handed to the driver factory / 生成驱动配置
    pub fn driver_config(&self) -> serde_json::Value {
        match self.driver.as_str() {
            "s3" => serde_json::to_value(S3Config {
                bucket: self.bucket.clone(),
                endpoint: self.endpoint.clone(),
                region: self.region.clone(),
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
                session_token: self.session_token.clone(),
                force_path_style: self.force_path_style,
            })
            .unwrap_or_default(),
            _ => serde_json::json!({ "bucket": self.bucket }),
        }
    }
}

impl LinkConfig {
    pub fn link_options(&self) -> LinkOptions {
        LinkOptions {
            expire_secs: self.expire_secs,
            content_type: if self.content_type.is_empty() {
                None
            } else {
                Some(self.content_type.clone())
            },
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment overrides / 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) -> Result<(), String> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bucket) = lookup("S3_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Some(region) = lookup("S3_REGION") {
            self.storage.region = region;
        }
        if let Some(endpoint) = lookup("S3_ENDPOINT") {
            self.storage.endpoint = endpoint;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| format!("Invalid PORT {:?}: {}", port, e))?;
        }
        Ok(())
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("BUCKET_PROXY_CONFIG") {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config() -> Result<AppConfig, String> {
    let config_path = get_config_path();

    let mut config = if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        config
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config(&config, &config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        config
    };

    config.apply_env_overrides()?;
    Ok(config)
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig, config_path: &PathBuf) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
