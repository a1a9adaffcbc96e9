use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::HandlerError;

/// Body fields that together select an upload / 上传所需字段
const UPLOAD_FIELDS: [&str; 3] = ["file_based_64", "file_type", "filename"];
/// Body field that names an existing object / 对象键字段
const FILE_FIELD: &str = "file";

/// Invocation event delivered by the platform / 调用事件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub http_method: Option<String>,
    pub body_json: Value,
}

impl Invocation {
    pub fn new(http_method: &str, body_json: Value) -> Self {
        Self {
            http_method: Some(http_method.to_string()),
            body_json,
        }
    }

    /// Read `http-method` and `body-json`; other event fields are ignored / 解析事件
    pub fn from_event(event: &Value) -> Self {
        Self {
            http_method: event
                .get("http-method")
                .and_then(Value::as_str)
                .map(str::to_string),
            body_json: event.get("body-json").cloned().unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl FromStr for Method {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            _ => Err(HandlerError::MethodNotAllowed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadRequest {
    pub file_based_64: String,
    pub file_type: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRequest {
    pub file: String,
}

/// Operation selected by method and body shape / 操作类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Upload(UploadRequest),
    DownloadLink(FileRequest),
    Delete(FileRequest),
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Upload(_) => "upload",
            Operation::DownloadLink(_) => "download-link",
            Operation::Delete(_) => "delete",
        }
    }

    /// Validate an invocation before anything touches storage / 校验并解析操作
    pub fn from_invocation(invocation: &Invocation) -> Result<Self, HandlerError> {
        let method: Method = invocation
            .http_method
            .as_deref()
            .ok_or(HandlerError::MethodNotAllowed)?
            .parse()?;

        match method {
            Method::Get => Ok(Operation::List),
            Method::Post => {
                let body = body_object(&invocation.body_json)?;
                // upload fields win when `file` is also present
                if UPLOAD_FIELDS.iter().all(|field| body.contains_key(*field)) {
                    parse_fields(&invocation.body_json).map(Operation::Upload)
                } else if body.contains_key(FILE_FIELD) {
                    parse_file(&invocation.body_json).map(Operation::DownloadLink)
                } else {
                    Err(HandlerError::InvalidPayload)
                }
            }
            Method::Delete => {
                let body = body_object(&invocation.body_json)?;
                if body.contains_key(FILE_FIELD) {
                    parse_file(&invocation.body_json).map(Operation::Delete)
                } else {
                    Err(HandlerError::InvalidPayload)
                }
            }
        }
    }
}

fn body_object(body: &Value) -> Result<&serde_json::Map<String, Value>, HandlerError> {
    body.as_object().ok_or(HandlerError::InvalidPayload)
}

fn parse_fields<T: DeserializeOwned>(body: &Value) -> Result<T, HandlerError> {
    serde_json::from_value(body.clone()).map_err(|_| HandlerError::InvalidPayload)
}

/// An empty key would address the bucket itself / 空键指向存储桶本身
fn parse_file(body: &Value) -> Result<FileRequest, HandlerError> {
    let req: FileRequest = parse_fields(body)?;
    if req.file.is_empty() {
        return Err(HandlerError::InvalidPayload);
    }
    Ok(req)
}
