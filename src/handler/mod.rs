//! Request dispatcher / 请求分发
//!
//! One invocation selects one operation and issues at most one storage call.
//! Every failure is turned into a payload here, so callers always receive
//! exactly one response.

pub mod error;
pub mod event;
pub mod response;

pub use error::HandlerError;
pub use event::{FileRequest, Invocation, Method, Operation, UploadRequest};

use bytes::Bytes;
use serde_json::Value;

use crate::config::AppConfig;
use crate::storage::{DriverBox, LinkOptions};
use crate::utils::{decode_upload, guess_content_type, object_key, public_url};

/// Per-process dispatcher settings / 分发器设置
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Host used for upload URLs, empty for the bucket's S3 host
    pub public_host: String,
    pub link: LinkOptions,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            public_host: String::new(),
            link: LinkOptions {
                expire_secs: 300,
                content_type: Some("application/octet-stream".to_string()),
            },
        }
    }
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            public_host: config.storage.public_host.clone(),
            link: config.link.link_options(),
        }
    }
}

/// Request dispatcher bound to one storage driver / 请求分发器
pub struct Dispatcher {
    driver: DriverBox,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(driver: DriverBox, settings: DispatchSettings) -> Self {
        Self { driver, settings }
    }

    pub fn driver(&self) -> &DriverBox {
        &self.driver
    }

    /// Serve one invocation; never fails / 处理一次调用
    pub async fn handle(&self, invocation: Invocation) -> Value {
        let operation = match Operation::from_invocation(&invocation) {
            Ok(op) => op,
            Err(e) => {
                tracing::warn!(
                    "Rejected invocation: method={:?}, status={}",
                    invocation.http_method,
                    e.status_code()
                );
                return e.into_payload();
            }
        };

        let kind = operation.kind();
        tracing::debug!("Dispatching {} on bucket {}", kind, self.driver.bucket());

        match self.execute(operation).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("{} failed: {}", kind, e);
                e.into_payload()
            }
        }
    }

    /// Run a validated operation / 执行已校验的操作
    pub async fn execute(&self, operation: Operation) -> Result<Value, HandlerError> {
        match operation {
            Operation::List => self.list().await,
            Operation::Upload(req) => self.upload(req).await,
            Operation::DownloadLink(req) => self.download_link(req).await,
            Operation::Delete(req) => self.delete(req).await,
        }
    }

    async fn list(&self) -> Result<Value, HandlerError> {
        let keys = self.driver.list_keys().await?;
        Ok(response::listing(&keys)?)
    }

    async fn upload(&self, req: UploadRequest) -> Result<Value, HandlerError> {
        let content = decode_upload(&req.file_based_64)?;
        let key = object_key(&req.filename, &req.file_type);
        let content_type = guess_content_type(&req.file_type);

        tracing::info!("Uploading {} ({} bytes)", key, content.len());
        self.driver.put(&key, Bytes::from(content), &content_type).await?;

        let url = public_url(self.driver.bucket(), &self.settings.public_host, &key);
        Ok(response::uploaded(&url))
    }

    async fn download_link(&self, req: FileRequest) -> Result<Value, HandlerError> {
        let url = self.driver.presign_get(&req.file, &self.settings.link).await?;
        Ok(response::download_link(&url))
    }

    async fn delete(&self, req: FileRequest) -> Result<Value, HandlerError> {
        self.driver.delete(&req.file).await?;
        tracing::info!("Deleted {}", req.file);
        Ok(response::deleted(&req.file))
    }
}
