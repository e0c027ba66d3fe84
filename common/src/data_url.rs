//! Data URL 操作

use crate::error::{Error, Result};

/// Data URLをMIMEタイプとBase64データ部分に分割
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// (MIMEタイプ, Base64データ)。Base64形式でない場合はエラー
pub fn split_data_url(data_url: &str) -> Result<(&str, &str)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| Error::Parse("Data URLではありません".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Parse("Data URLにデータ部がありません".into()))?;

    let mut params = header.split(';');
    let mime_type = params.next().unwrap_or_default();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(Error::Parse("Base64形式のData URLではありません".into()));
    }
    if mime_type.is_empty() || payload.is_empty() {
        return Err(Error::Parse("Data URLが不完全です".into()));
    }

    Ok((mime_type, payload))
}

/// Data URLかどうか
pub fn is_data_url(s: &str) -> bool {
    s.trim_start().starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_jpeg() {
        let (mime, data) = split_data_url("data:image/jpeg;base64,/9j/4AAQSkZJRg==").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(data, "/9j/4AAQSkZJRg==");
    }

    #[test]
    fn test_split_webp() {
        let (mime, data) = split_data_url("data:image/webp;base64,UklGR").unwrap();
        assert_eq!(mime, "image/webp");
        assert_eq!(data, "UklGR");
    }

    #[test]
    fn test_split_invalid() {
        assert!(split_data_url("not a data url").is_err());
        assert!(split_data_url("").is_err());
        assert!(split_data_url("data:image/png;base64").is_err());
        assert!(split_data_url("data:image/png,rawtext").is_err());
        assert!(split_data_url("data:;base64,AAAA").is_err());
    }

    #[test]
    fn test_is_data_url() {
        assert!(is_data_url("data:image/png;base64,AAAA"));
        assert!(!is_data_url("https://example.com/a.png"));
    }
}
