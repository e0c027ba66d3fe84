//! Gemini API連携
//!
//! 画像パート＋指示文の1リクエストを送り、構造化JSONのテキストを受け取る。
//! モデル呼び出しは `SimilarityModel` で差し替え可能。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::{LensError, Result};
use product_lens_common::UploadedImage;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini APIリクエスト
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(image: &UploadedImage) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.base64().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

impl GenerateRequest {
    /// 単一ターンのJSON出力リクエスト
    pub fn json(parts: Vec<Part>, schema: serde_json::Value) -> Self {
        Self {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
                response_schema: Some(schema),
            },
        }
    }

    /// 画像パートの数
    pub fn image_count(&self) -> usize {
        self.parts()
            .filter(|p| matches!(p, Part::InlineData { .. }))
            .count()
    }

    /// 最後のテキストパート（指示文）
    pub fn instruction(&self) -> Option<&str> {
        self.parts().rev().find_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            Part::InlineData { .. } => None,
        })
    }

    fn parts(&self) -> impl DoubleEndedIterator<Item = &Part> + '_ {
        self.contents.iter().flat_map(|c| c.parts.iter())
    }
}

/// Gemini APIレスポンス
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// 先頭候補のテキストを連結
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// マルチモーダルモデルの呼び出し
#[async_trait]
pub trait SimilarityModel: Send + Sync {
    /// 1回のリクエストで生成テキストを返す
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

#[async_trait]
impl<T: SimilarityModel + ?Sized> SimilarityModel for Arc<T> {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        (**self).generate(request).await
    }
}

/// Gemini APIクライアント
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// APIキーがなければリクエスト前にエラー
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl SimilarityModel for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model, images = request.image_count()))]
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LensError::Timeout("Gemini API".into())
                } else {
                    LensError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LensError::ApiCall {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LensError::ApiParse(e.to_string()))?;

        let text = payload
            .into_text()
            .ok_or_else(|| LensError::ApiParse("Empty response".into()))?;

        debug!("レスポンス長: {} chars", text.len());
        info!("Gemini応答を受信");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialize() {
        let request = GenerateRequest::json(
            vec![Part::text("テストプロンプト")],
            serde_json::json!({"type": "ARRAY"}),
        );

        let json = serde_json::to_string(&request).expect("シリアライズ失敗");
        assert!(json.contains("\"contents\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"temperature\":0.1"));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
        assert!(json.contains("\"responseSchema\":{\"type\":\"ARRAY\"}"));
    }

    #[test]
    fn test_part_text_serialize() {
        let json = serde_json::to_string(&Part::text("Hello")).expect("シリアライズ失敗");
        assert_eq!(json, r#"{"text":"Hello"}"#);
    }

    #[test]
    fn test_part_image_serialize() {
        let image = UploadedImage::from_data_url("data:image/jpeg;base64,/9j/4AAQ", "x").unwrap();
        let json = serde_json::to_string(&Part::image(&image)).expect("シリアライズ失敗");
        assert!(json.contains("\"inline_data\""));
        assert!(json.contains("\"mime_type\":\"image/jpeg\""));
        assert!(json.contains("\"data\":\"/9j/4AAQ\""));
    }

    #[test]
    fn test_image_count_and_instruction() {
        let image = UploadedImage::from_data_url("data:image/png;base64,iVBORw0KGgo=", "x").unwrap();
        let request = GenerateRequest::json(
            vec![Part::image(&image), Part::image(&image), Part::text("compare")],
            serde_json::Value::Null,
        );
        assert_eq!(request.image_count(), 2);
        assert_eq!(request.instruction(), Some("compare"));
    }

    #[test]
    fn test_response_text() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "[{\"productId\": "}, {"text": "\"p1\"}]"}]
                }
            }]
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(response.into_text().as_deref(), Some(r#"[{"productId": "p1"}]"#));
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_endpoint() {
        let config = Config {
            api_key: Some("test-key".into()),
            ..Config::default()
        };
        // 環境変数が優先されるため、キーの値ではなくエンドポイントのみ検証
        let client = GeminiClient::new(&config).unwrap().with_base_url("http://localhost:9/v1/");
        assert_eq!(client.model(), "gemini-2.5-flash");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1/gemini-2.5-flash:generateContent"
        );
    }
}
