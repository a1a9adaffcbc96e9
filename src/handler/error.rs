use serde_json::Value;
use thiserror::Error;

use super::response;

/// Errors raised while serving one invocation / 请求处理错误
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Body does not carry the fields of any operation / 请求体无效
    #[error("Invalid payload")]
    InvalidPayload,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Upload content is not base64 even after padding repair / base64解码失败
    #[error("{0}")]
    Decode(#[from] base64::DecodeError),

    #[error("{0}")]
    Encode(#[from] serde_json::Error),

    /// Any failure reported by the storage driver / 存储错误
    #[error("{0}")]
    Storage(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::InvalidPayload => 400,
            HandlerError::MethodNotAllowed => 405,
            HandlerError::Decode(_) | HandlerError::Encode(_) | HandlerError::Storage(_) => 500,
        }
    }

    /// Convert into the payload returned to the caller / 转换为响应载荷
    pub fn into_payload(self) -> Value {
        match self {
            HandlerError::InvalidPayload | HandlerError::MethodNotAllowed => {
                response::status_body(self.status_code(), &self.to_string())
            }
            other => response::exception(&other.to_string()),
        }
    }
}
