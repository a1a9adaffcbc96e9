//! S3驱动核心实现
//!
//! 设计原则：
//! - 每个原语只发出一次S3请求（list除外，会跟随分页）
//! - 上传直接覆盖同名对象
//! - 预签名URL由本地签名生成，不检查对象是否存在
//! - 对象键原样使用；空键或以 `/` 开头的键无法原样寻址，直接报错

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;

use crate::storage::{StorageDriver, LinkOptions};
use super::config::S3Config;

/// 强制下载响应类型的查询参数
const RESPONSE_CONTENT_TYPE: &str = "response-content-type";

/// Key as sent to S3, or an error when it cannot be addressed verbatim / 校验对象键
///
/// The request path drops a leading `/`, so `""` or `"/"` would hit the bucket
/// root and `"/a.txt"` would hit `a.txt`.
fn checked_key(key: &str) -> Result<&str> {
    if key.is_empty() {
        return Err(anyhow!("Object key must not be empty"));
    }
    if key.starts_with('/') {
        return Err(anyhow!("Object key must not start with '/': {}", key));
    }
    Ok(key)
}

/// S3驱动
pub struct S3Driver {
    config: S3Config,
    bucket: Box<Bucket>,
}

impl S3Driver {
    /// 创建新的S3驱动实例
    pub fn new(config: S3Config) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(anyhow!("S3存储桶名称不能为空"));
        }
        let bucket = Self::create_bucket(&config)?;
        Ok(Self { config, bucket })
    }

    /// 创建S3 Bucket客户端
    fn create_bucket(config: &S3Config) -> Result<Box<Bucket>> {
        let credentials = if config.has_static_keys() {
            Credentials::new(
                Some(&config.access_key_id),
                Some(&config.secret_access_key),
                if config.session_token.is_empty() { None } else { Some(&config.session_token) },
                None,
                None,
            )
        } else {
            // 未配置密钥：从环境变量 / profile / 实例凭证读取
            Credentials::new(None, None, None, None, None)
        };
        let credentials = credentials.map_err(|e| anyhow!("创建S3凭证失败: {}", e))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.resolved_endpoint(),
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| anyhow!("创建S3 Bucket失败: {}", e))?;

        let bucket = if config.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(bucket)
    }
}

#[async_trait]
impl StorageDriver for S3Driver {
    fn name(&self) -> &str {
        "S3"
    }

    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let results = self.bucket
            .list(String::new(), None)
            .await
            .map_err(|e| anyhow!("{}", e))?;

        let keys: Vec<String> = results
            .into_iter()
            .flat_map(|page| page.contents.into_iter().map(|obj| obj.key))
            .collect();

        tracing::debug!("S3 list: bucket={}, keys={}", self.config.bucket, keys.len());
        Ok(keys)
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let key = checked_key(key)?;
        tracing::debug!("S3 put: key={}, size={}, content_type={}", key, data.len(), content_type);

        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| anyhow!("{}", e))?;

        Ok(())
    }

    async fn presign_get(&self, key: &str, options: &LinkOptions) -> Result<String> {
        let key = checked_key(key)?;
        let custom_queries = options.content_type.as_ref().map(|content_type| {
            let mut queries = HashMap::new();
            queries.insert(RESPONSE_CONTENT_TYPE.to_string(), content_type.clone());
            queries
        });

        let url = self.bucket
            .presign_get(key, options.expire_secs, custom_queries)
            .await
            .map_err(|e| anyhow!("{}", e))?;

        tracing::debug!("S3 presign: key={}, expire={}s", key, options.expire_secs);
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = checked_key(key)?;
        // S3 DeleteObject 对不存在的键同样返回 204
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| anyhow!("{}", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    use crate::handler::{DispatchSettings, Dispatcher, Invocation};

    fn static_config() -> S3Config {
        S3Config {
            bucket: "mownika-poc-s3".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            ..Default::default()
        }
    }

    type Requests = Arc<Mutex<Vec<String>>>;
    type Replies = Arc<Mutex<VecDeque<(u16, String)>>>;

    /// Local HTTP endpoint answering S3 requests with canned replies in order
    struct FakeS3 {
        endpoint: String,
        requests: Requests,
    }

    impl FakeS3 {
        async fn start(replies: Vec<(u16, String)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let endpoint = format!("http://{}", listener.local_addr().unwrap());
            let requests: Requests = Arc::new(Mutex::new(Vec::new()));
            let replies: Replies = Arc::new(Mutex::new(replies.into_iter().collect()));

            let seen = requests.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve_connection(stream, seen.clone(), replies.clone()));
                }
            });

            Self { endpoint, requests }
        }

        fn driver(&self) -> S3Driver {
            S3Driver::new(S3Config {
                endpoint: self.endpoint.clone(),
                force_path_style: true,
                ..static_config()
            })
            .unwrap()
        }

        /// Request heads received so far, lowercased
        fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    async fn serve_connection(stream: TcpStream, seen: Requests, replies: Replies) {
        let (read, mut write) = stream.into_split();
        let mut reader = BufReader::new(read);

        loop {
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line).await {
                    Ok(0) | Err(_) => return,
                    Ok(_) => {}
                }
                if line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
                head.push_str(&line.to_ascii_lowercase());
            }

            let mut body = vec![0u8; content_length];
            if reader.read_exact(&mut body).await.is_err() {
                return;
            }
            seen.lock().push(head);

            let (status, body) = replies
                .lock()
                .pop_front()
                .unwrap_or((500, String::new()));
            let reply = format!(
                "HTTP/1.1 {} Fake\r\nContent-Type: application/xml\r\nETag: \"d41d8cd9\"\r\nContent-Length: {}\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            if write.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    fn list_page(keys: &[&str], next_token: Option<&str>) -> String {
        let contents: String = keys
            .iter()
            .map(|key| {
                format!(
                    "<Contents><Key>{}</Key><LastModified>2024-01-01T00:00:00.000Z</LastModified>\
                     <ETag>\"d41d8cd9\"</ETag><Size>5</Size><StorageClass>STANDARD</StorageClass></Contents>",
                    key
                )
            })
            .collect();
        let token = next_token
            .map(|t| format!("<NextContinuationToken>{}</NextContinuationToken>", t))
            .unwrap_or_default();

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
             <Name>mownika-poc-s3</Name><Prefix></Prefix><KeyCount>{}</KeyCount><MaxKeys>1000</MaxKeys>\
             <IsTruncated>{}</IsTruncated>{}{}</ListBucketResult>",
            keys.len(),
            next_token.is_some(),
            token,
            contents
        )
    }

    #[test]
    fn test_resolved_endpoint() {
        let mut config = static_config();
        assert_eq!(config.resolved_endpoint(), "https://s3.us-east-1.amazonaws.com");

        config.endpoint = "http://localhost:9000/".to_string();
        assert_eq!(config.resolved_endpoint(), "http://localhost:9000");
    }

    #[test]
    fn test_empty_bucket_rejected() {
        let config = S3Config { bucket: String::new(), ..static_config() };
        assert!(S3Driver::new(config).is_err());
    }

    #[test]
    fn test_checked_key() {
        assert_eq!(checked_key("docs/a.txt").unwrap(), "docs/a.txt");
        assert!(checked_key("").is_err());
        assert!(checked_key("/").is_err());
        assert!(checked_key("/a.txt").is_err());
    }

    #[tokio::test]
    async fn test_presign_forces_content_type() {
        let driver = S3Driver::new(static_config()).unwrap();
        let options = LinkOptions {
            expire_secs: 300,
            content_type: Some("application/octet-stream".to_string()),
        };

        let url = driver.presign_get("note.txt", &options).await.unwrap();
        assert!(url.contains("mownika-poc-s3"));
        assert!(url.contains("note.txt"));
        assert!(url.contains("X-Amz-Expires=300"));
        assert!(url.contains("response-content-type=application%2Foctet-stream"));
    }

    #[tokio::test]
    async fn test_presign_path_style() {
        let config = S3Config {
            endpoint: "http://localhost:9000".to_string(),
            force_path_style: true,
            ..static_config()
        };
        let driver = S3Driver::new(config).unwrap();
        let options = LinkOptions { expire_secs: 60, content_type: None };

        let url = driver.presign_get("note.txt", &options).await.unwrap();
        assert!(url.starts_with("http://localhost:9000/mownika-poc-s3/note.txt?"));
        assert!(!url.contains(RESPONSE_CONTENT_TYPE));

        assert!(driver.presign_get("/note.txt", &options).await.is_err());
    }

    #[tokio::test]
    async fn test_list_follows_continuation() {
        let fake = FakeS3::start(vec![
            (200, list_page(&["a.txt", "b.txt"], Some("page-2"))),
            (200, list_page(&["c.txt"], None)),
        ])
        .await;

        let keys = fake.driver().list_keys().await.unwrap();
        assert_eq!(keys, vec!["a.txt", "b.txt", "c.txt"]);

        let requests = fake.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("get /mownika-poc-s3/"));
        assert!(requests[1].contains("continuation-token=page-2"));
    }

    #[tokio::test]
    async fn test_put_sends_content_type() {
        let fake = FakeS3::start(vec![(200, String::new())]).await;
        fake.driver()
            .put("note.txt", Bytes::from_static(b"hello"), "text/plain")
            .await
            .unwrap();

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("put /mownika-poc-s3/note.txt "));
        assert!(requests[0].contains("content-type: text/plain"));
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let fake = FakeS3::start(vec![(204, String::new())]).await;
        let dispatcher = Dispatcher::new(Arc::new(fake.driver()), DispatchSettings::default());

        let payload = dispatcher
            .handle(Invocation::new("DELETE", json!({ "file": "ghost.txt" })))
            .await;
        assert_eq!(payload, json!({ "statusCode": 201, "status": "ghost.txt deleted successfully" }));
        assert!(fake.requests()[0].starts_with("delete /mownika-poc-s3/ghost.txt "));
    }

    #[tokio::test]
    async fn test_empty_key_never_reaches_bucket() {
        let fake = FakeS3::start(vec![]).await;
        let driver = fake.driver();
        assert!(driver.delete("").await.is_err());
        assert!(driver.delete("/").await.is_err());

        let dispatcher = Dispatcher::new(Arc::new(driver), DispatchSettings::default());
        let payload = dispatcher
            .handle(Invocation::new("DELETE", json!({ "file": "" })))
            .await;
        assert_eq!(payload["statusCode"], 400);
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_becomes_500() {
        let denied = "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>";
        let fake = FakeS3::start(vec![(403, denied.to_string()), (404, String::new())]).await;
        let dispatcher = Dispatcher::new(Arc::new(fake.driver()), DispatchSettings::default());

        let payload = dispatcher.handle(Invocation::new("GET", serde_json::Value::Null)).await;
        assert_eq!(payload["statusCode"], 500);
        let body: serde_json::Value = serde_json::from_str(payload["body"].as_str().unwrap()).unwrap();
        assert!(body["error"].as_str().unwrap().contains("403"));

        let payload = dispatcher
            .handle(Invocation::new("DELETE", json!({ "file": "note.txt" })))
            .await;
        assert_eq!(payload["statusCode"], 500);
        assert_eq!(fake.requests().len(), 2);
    }
}
