//! In-process bucket driver / 内存存储驱动
//!
//! Used for local runs without cloud credentials and as the test double for
//! the dispatcher. Keys are kept in lexicographic order like S3 listings.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

use super::{ConfigItem, DriverBox, DriverFactory, DriverInfo, LinkOptions, StorageDriver};

const LINK_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// Object returned when a memory link is dereferenced / 通过链接读取的对象
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedObject {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
struct MemoryConfig {
    bucket: String,
}

/// Memory driver / 内存驱动
pub struct MemoryDriver {
    bucket: String,
    objects: RwLock<BTreeMap<String, StoredObject>>,
    calls: AtomicUsize,
    failure: RwLock<Option<String>>,
}

impl MemoryDriver {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: RwLock::new(BTreeMap::new()),
            calls: AtomicUsize::new(0),
            failure: RwLock::new(None),
        }
    }

    /// Number of storage calls served so far / 已执行的存储调用次数
    pub fn storage_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with `message` (None clears it) / 模拟后端故障
    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.write() = message.map(str::to_string);
    }

    /// Raw bytes stored at `key` / 读取对象内容
    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.read().get(key).map(|o| o.data.clone())
    }

    /// Stored content type of `key` / 读取对象类型
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).map(|o| o.content_type.clone())
    }

    /// Dereference a link issued by `presign_get` / 解析预签名链接
    ///
    /// Returns None when the link is foreign, expired or the object is missing,
    /// which is what a client fetching a dangling link would observe.
    pub fn fetch(&self, url: &str) -> Option<FetchedObject> {
        let rest = url.strip_prefix(LINK_SCHEME)?;
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (bucket, encoded_key) = path.split_once('/')?;
        if bucket != self.bucket {
            return None;
        }
        let key = urlencoding::decode(encoded_key).ok()?;

        let params: HashMap<&str, String> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .filter_map(|(k, v)| urlencoding::decode(v).ok().map(|v| (k, v.into_owned())))
            .collect();

        let issued: u64 = params.get("X-Amz-Date")?.parse().ok()?;
        let expires: u64 = params.get("X-Amz-Expires")?.parse().ok()?;
        if unix_now() > issued + expires {
            return None;
        }

        let objects = self.objects.read();
        let object = objects.get(&*key)?;
        let content_type = params
            .get("response-content-type")
            .cloned()
            .unwrap_or_else(|| object.content_type.clone());

        Some(FetchedObject {
            data: object.data.clone(),
            content_type,
        })
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.read().as_ref() {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait]
impl StorageDriver for MemoryDriver {
    fn name(&self) -> &str {
        "Memory"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        self.begin_call()?;
        Ok(self.objects.read().keys().cloned().collect())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.begin_call()?;
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn presign_get(&self, key: &str, options: &LinkOptions) -> Result<String> {
        self.begin_call()?;
        let mut url = format!(
            "{}{}/{}?X-Amz-Date={}&X-Amz-Expires={}",
            LINK_SCHEME,
            self.bucket,
            urlencoding::encode(key),
            unix_now(),
            options.expire_secs,
        );
        if let Some(ref content_type) = options.content_type {
            url.push_str("&response-content-type=");
            url.push_str(&urlencoding::encode(content_type));
        }
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.begin_call()?;
        self.objects.write().remove(key);
        Ok(())
    }
}

/// Memory driver factory / 内存驱动工厂
pub struct MemoryDriverFactory;

impl DriverFactory for MemoryDriverFactory {
    fn driver_type(&self) -> &'static str {
        "memory"
    }

    fn create_driver(&self, config: Value) -> Result<DriverBox> {
        let config: MemoryConfig = serde_json::from_value(config)
            .map_err(|e| anyhow!("配置解析失败: {}", e))?;
        Ok(std::sync::Arc::new(MemoryDriver::new(&config.bucket)))
    }

    fn driver_info(&self) -> DriverInfo {
        DriverInfo {
            driver_type: "memory".to_string(),
            display_name: "Memory".to_string(),
            items: vec![
                ConfigItem::new("bucket", "string")
                    .title("存储桶名称")
                    .required(),
            ],
        }
    }
}
