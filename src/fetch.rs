//! 画像URLの取得
//!
//! 取得方法は `ImageFetcher` で差し替え可能。`HttpFetcher` は必要に応じて
//! CORS回避用の中継サーバーを経由する。

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{LensError, Result};

/// 取得した画像データ
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// レスポンスの Content-Type（なければ None）
    pub content_type: Option<String>,
}

/// 画像の取得方法
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

#[async_trait]
impl<T: ImageFetcher + ?Sized> ImageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        (**self).fetch(url).await
    }
}

/// HTTP GETによる取得
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    proxy_prefix: Option<String>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            proxy_prefix: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Self::new(config.fetch_timeout())?;
        Ok(match &config.cors_proxy {
            Some(prefix) if !prefix.trim().is_empty() => fetcher.with_proxy(prefix.trim()),
            _ => fetcher,
        })
    }

    /// 中継サーバーを設定（`{prefix}{url}` の形でリクエストする）
    pub fn with_proxy(mut self, prefix: impl Into<String>) -> Self {
        self.proxy_prefix = Some(prefix.into());
        self
    }

    /// 実際にリクエストするURL
    pub fn request_url(&self, url: &str) -> String {
        match &self.proxy_prefix {
            Some(prefix) => format!("{}{}", prefix, url),
            None => url.to_string(),
        }
    }

    fn status_reason(&self, status: StatusCode) -> String {
        let via_proxy = self.proxy_prefix.is_some();
        match status {
            StatusCode::TOO_MANY_REQUESTS if via_proxy => {
                "中継サーバーのリクエスト制限を超えました (429)".into()
            }
            StatusCode::FORBIDDEN if via_proxy => {
                "中継サーバーがアクセスを拒否しました (403)".into()
            }
            StatusCode::SERVICE_UNAVAILABLE if via_proxy => {
                "中継サーバーが利用できません (503)".into()
            }
            StatusCode::FORBIDDEN => "アクセスが拒否されました (403)。アクセス制限の可能性があります".into(),
            other => format!("HTTP error! status: {}", other.as_u16()),
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let request_url = self.request_url(url);
        debug!("画像取得: {}", request_url);

        let response = self.client.get(&request_url).send().await.map_err(|e| {
            if e.is_timeout() {
                LensError::Timeout(url.to_string())
            } else {
                LensError::ImageFetch {
                    url: url.to_string(),
                    reason: format!("ネットワークエラー: {}", e),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LensError::ImageFetch {
                url: url.to_string(),
                reason: self.status_reason(status),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                LensError::Timeout(url.to_string())
            } else {
                LensError::ImageFetch {
                    url: url.to_string(),
                    reason: format!("レスポンス読み込み失敗: {}", e),
                }
            }
        })?;

        debug!("取得完了: {} bytes ({:?})", bytes.len(), content_type);

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
