//! Response payload shapes / 响应载荷
//!
//! Field names and the nested JSON strings are part of the wire contract
//! existing callers depend on.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{json, Value};

/// Formatter producing `{"a": [1, 2]}` with non-ASCII escaped as `\uXXXX`,
/// the encoding callers already parse the nested strings with.
struct CompatFormatter;

impl Formatter for CompatFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Encode a value for embedding as a string field / 编码为嵌套JSON字符串
pub fn to_compat_json(value: &Value) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, CompatFormatter);
    value.serialize(&mut ser)?;
    // only ASCII is ever written
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// GET: `{"data": "{\"data\": [...]}"}`
pub fn listing(keys: &[String]) -> serde_json::Result<Value> {
    let inner = to_compat_json(&json!({ "data": keys }))?;
    Ok(json!({ "data": inner }))
}

pub fn uploaded(s3_url: &str) -> Value {
    json!({
        "data": {
            "statusCode": 201,
            "s3_url": s3_url
        }
    })
}

pub fn download_link(url: &str) -> Value {
    json!({ "file-url": url })
}

pub fn deleted(file: &str) -> Value {
    json!({
        "statusCode": 201,
        "status": format!("{} deleted successfully", file)
    })
}

pub fn status_body(status: u16, body: &str) -> Value {
    json!({
        "statusCode": status,
        "body": body
    })
}

/// 500 with `{"error": message}` encoded into `body` / 异常响应
pub fn exception(message: &str) -> Value {
    let body = to_compat_json(&json!({ "error": message }))
        .unwrap_or_else(|_| message.to_string());
    status_body(500, &body)
}
