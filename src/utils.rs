//! Payload and key helpers / 载荷与对象键工具函数

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{DecodeError, Engine as _};

/// Standard alphabet, canonical padding, non-zero trailing bits accepted
const UPLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// Append `=` until the length is a multiple of 4 / 补全base64填充
pub fn restore_padding(encoded: &str) -> String {
    let missing = (4 - encoded.len() % 4) % 4;
    let mut padded = String::with_capacity(encoded.len() + missing);
    padded.push_str(encoded);
    padded.extend(std::iter::repeat('=').take(missing));
    padded
}

/// Decode an uploaded payload, repairing its padding first / 解码上传内容
/// ASCII whitespace (line wrapping) is ignored; missing or surplus `=` is
/// replaced by canonical padding.
pub fn decode_upload(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    UPLOAD_ENGINE.decode(restore_padding(compact.trim_end_matches('=')))
}

/// Storage key for an upload: `{filename}.{file_type}` / 生成对象键
pub fn object_key(filename: &str, file_type: &str) -> String {
    format!("{}.{}", filename, file_type)
}

/// Public (unsigned) URL of an object / 对象公开URL
/// Empty `public_host` means the bucket's virtual-hosted S3 address.
pub fn public_url(bucket: &str, public_host: &str, key: &str) -> String {
    if public_host.is_empty() {
        format!("https://{}.s3.amazonaws.com/{}", bucket, key)
    } else {
        format!("{}/{}", public_host.trim_end_matches('/'), key)
    }
}

/// Guess content type from the upload's extension / 根据扩展名推断类型
pub fn guess_content_type(file_type: &str) -> String {
    mime_guess::from_ext(file_type)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn test_restore_padding() {
        assert_eq!(restore_padding(""), "");
        assert_eq!(restore_padding("aGVsbG8"), "aGVsbG8=");
        assert_eq!(restore_padding("aGVsbA"), "aGVsbA==");
        assert_eq!(restore_padding("aGVs"), "aGVs");
    }

    #[test]
    fn test_decode_with_and_without_padding() {
        assert_eq!(decode_upload("aGVsbG8").unwrap(), b"hello");
        assert_eq!(decode_upload("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_upload("aGVs\nbG8=").unwrap(), b"hello");
        assert_eq!(decode_upload("aGVsbG8==").unwrap(), b"hello");
        assert_eq!(decode_upload("aGVsbA====").unwrap(), b"hell");

        // every residue of the payload length mod 3
        for len in 0..12usize {
            let content: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37)).collect();
            let stripped = STANDARD.encode(&content).trim_end_matches('=').to_string();
            assert_eq!(decode_upload(&stripped).unwrap(), content, "len {}", len);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_upload("not base64!").is_err());
        // 5 data characters can never be valid
        assert!(decode_upload("aGVsb").is_err());
    }

    #[test]
    fn test_object_key_and_public_url() {
        let key = object_key("note", "txt");
        assert_eq!(key, "note.txt");
        assert_eq!(
            public_url("mownika-poc-s3", "", &key),
            "https://mownika-poc-s3.s3.amazonaws.com/note.txt"
        );
        assert_eq!(
            public_url("mownika-poc-s3", "https://cdn.example.com/", &key),
            "https://cdn.example.com/note.txt"
        );
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("txt"), "text/plain");
        assert_eq!(guess_content_type("png"), "image/png");
        assert_eq!(guess_content_type("zzz-unknown"), "application/octet-stream");
    }
}
