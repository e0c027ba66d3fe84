//! 検索で扱う型の定義
//!
//! - Product: カタログの商品
//! - UploadedImage: 正規化済みのユーザー画像
//! - SimilarityResult: AIが返す類似度
//! - ProductMatch: 類似度と商品を結合した表示用データ

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::data_url::split_data_url;
use crate::error::{Error, Result};

/// カタログの商品（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
}

/// 正規化済みの画像
///
/// `base64` は `data:` プレフィックスを含まず、`mime_type` は必ず `image/` で始まる。
/// コンストラクタ経由でのみ生成できる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    base64: String,
    mime_type: String,
    source: String,
}

impl UploadedImage {
    /// 生バイト列から生成
    pub fn from_bytes(bytes: &[u8], mime_type: &str, source: impl Into<String>) -> Result<Self> {
        let mime_type = normalize_image_mime(mime_type)?;
        if bytes.is_empty() {
            return Err(Error::InvalidImage("画像データが空です".into()));
        }
        Ok(Self {
            base64: STANDARD.encode(bytes),
            mime_type,
            source: source.into(),
        })
    }

    /// Data URL（`data:image/png;base64,...`）から生成
    pub fn from_data_url(data_url: &str, source: impl Into<String>) -> Result<Self> {
        let (mime_type, payload) = split_data_url(data_url)?;
        let mime_type = normalize_image_mime(mime_type)?;
        // 壊れたペイロードをそのままAIへ送らない
        STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidImage(format!("Base64デコード失敗: {}", e)))?;
        Ok(Self {
            base64: payload.to_string(),
            mime_type,
            source: source.into(),
        })
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// ファイル名またはURL
    pub fn source(&self) -> &str {
        &self.source
    }

    /// デコード後のおおよそのバイト数
    pub fn approx_byte_len(&self) -> usize {
        self.base64.len() / 4 * 3
    }
}

/// MIMEタイプを小文字化し、パラメータ（`; charset=...`）を除去して画像か検証
pub fn normalize_image_mime(mime_type: &str) -> Result<String> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.strip_prefix("image/") {
        Some(subtype) if !subtype.is_empty() => Ok(essence),
        _ => Err(Error::InvalidImage(format!(
            "画像のMIMEタイプではありません: {}",
            mime_type
        ))),
    }
}

/// AIが返す類似度判定（1候補ごと）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    pub product_id: String,
    pub similarity_score: f64,
    pub justification: String,
}

/// 類似度判定と商品情報を結合した表示用データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMatch {
    #[serde(flatten)]
    pub product: Product,
    pub similarity_score: f64,
    pub justification: String,
}

impl ProductMatch {
    pub fn id(&self) -> &str {
        &self.product.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_encodes_without_prefix() {
        let image = UploadedImage::from_bytes(b"\x89PNG\r\n", "image/png", "a.png").unwrap();
        assert!(!image.base64().starts_with("data:"));
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.source(), "a.png");
    }

    #[test]
    fn test_from_bytes_rejects_non_image() {
        let result = UploadedImage::from_bytes(b"hello", "text/plain", "a.txt");
        assert!(matches!(result, Err(Error::InvalidImage(_))));
    }

    #[test]
    fn test_from_bytes_rejects_empty() {
        let result = UploadedImage::from_bytes(b"", "image/png", "empty.png");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_data_url() {
        let image = UploadedImage::from_data_url("data:image/jpeg;base64,/9j/4AAQSkZJRg==", "x").unwrap();
        assert_eq!(image.base64(), "/9j/4AAQSkZJRg==");
        assert_eq!(image.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_from_data_url_rejects_bad_payload() {
        let result = UploadedImage::from_data_url("data:image/png;base64,@@@", "x");
        assert!(matches!(result, Err(Error::InvalidImage(_))));
    }

    #[test]
    fn test_normalize_image_mime() {
        assert_eq!(normalize_image_mime("image/PNG").unwrap(), "image/png");
        assert_eq!(normalize_image_mime("image/jpeg; charset=binary").unwrap(), "image/jpeg");
        assert!(normalize_image_mime("image/").is_err());
        assert!(normalize_image_mime("application/octet-stream").is_err());
        assert!(normalize_image_mime("").is_err());
    }

    #[test]
    fn test_similarity_result_deserialize() {
        let json = r#"{"productId": "product-3", "similarityScore": 72.5, "justification": "同じ形状"}"#;
        let result: SimilarityResult = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(result.product_id, "product-3");
        assert_eq!(result.similarity_score, 72.5);
    }

    #[test]
    fn test_product_match_serializes_flat() {
        let m = ProductMatch {
            product: Product {
                id: "product-1".into(),
                name: "Stylish Jacket #1".into(),
                category: "Fashion".into(),
                image_url: "https://picsum.photos/seed/product-1/400/400".into(),
            },
            similarity_score: 90.0,
            justification: "色が一致".into(),
        };

        let json = serde_json::to_string(&m).expect("シリアライズ失敗");
        assert!(json.contains("\"id\":\"product-1\""));
        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"similarityScore\":90.0"));
        assert!(!json.contains("\"product\""));
    }
}
