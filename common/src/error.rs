//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let error = Error::Parse("productIdがありません".to_string());
        assert_eq!(format!("{}", error), "Parse error: productIdがありません");
    }

    #[test]
    fn test_error_display_invalid_image() {
        let error = Error::InvalidImage("text/plain".to_string());
        assert_eq!(format!("{}", error), "Invalid image: text/plain");
    }
}
