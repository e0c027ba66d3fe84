//! 画像入力の正規化
//!
//! ファイル選択・ドロップ・URLのいずれかを `UploadedImage`（Base64 + MIME）に変換する。
//! ファイルは読込前にMIMEタイプを検証する。

mod mime;

pub use mime::{mime_from_extension, sniff_image_mime};

use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::{LensError, Result};
use crate::fetch::ImageFetcher;
use product_lens_common::data_url::is_data_url;
use product_lens_common::types::normalize_image_mime;
use product_lens_common::UploadedImage;

/// 画像の入力元
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// ファイル選択（MIMEは拡張子から判定）
    File(PathBuf),
    /// ドラッグ&ドロップ（MIMEは宣言値）
    Dropped { path: PathBuf, mime_type: String },
    /// 画像URL（Data URLも可）
    Url(String),
}

/// 入力を正規化
pub async fn normalize(input: ImageInput, fetcher: &dyn ImageFetcher) -> Result<UploadedImage> {
    match input {
        ImageInput::File(path) => {
            let declared = mime_from_extension(&path).unwrap_or_default();
            from_local_file(&path, declared, false).await
        }
        ImageInput::Dropped { path, mime_type } => from_local_file(&path, &mime_type, true).await,
        ImageInput::Url(url) => from_url(&url, fetcher).await,
    }
}

/// ローカルファイルを読み込む（読込前にMIMEを検証）
pub async fn from_local_file(path: &Path, declared_mime: &str, dropped: bool) -> Result<UploadedImage> {
    let source_name = display_name(path);

    let mime_type = normalize_image_mime(declared_mime).map_err(|_| LensError::InvalidImageType {
        source_name: source_name.clone(),
        mime_type: declared_mime.to_string(),
        dropped,
    })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| LensError::ImageRead {
        source_name: source_name.clone(),
        reason: e.to_string(),
        dropped,
    })?;

    debug!("読込: {} ({}, {} bytes)", source_name, mime_type, bytes.len());

    UploadedImage::from_bytes(&bytes, &mime_type, source_name.clone()).map_err(|e| LensError::ImageRead {
        source_name,
        reason: e.to_string(),
        dropped,
    })
}

/// URLから取得。Data URLはその場でデコードする
#[instrument(skip(fetcher))]
pub async fn from_url(url: &str, fetcher: &dyn ImageFetcher) -> Result<UploadedImage> {
    let url = url.trim();
    if url.is_empty() {
        return Err(LensError::EmptyUrl);
    }

    if is_data_url(url) {
        return UploadedImage::from_data_url(url, "data URL").map_err(|e| LensError::ImageFetch {
            url: truncate(url, 48),
            reason: e.to_string(),
        });
    }

    let fetched = fetcher.fetch(url).await?;
    let mime_type = resolve_mime(fetched.content_type.as_deref(), &fetched.bytes).ok_or_else(|| {
        LensError::ImageFetch {
            url: url.to_string(),
            reason: format!(
                "画像ではありません (Content-Type: {})",
                fetched.content_type.as_deref().unwrap_or("なし")
            ),
        }
    })?;

    UploadedImage::from_bytes(&fetched.bytes, &mime_type, url).map_err(|e| LensError::ImageFetch {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Content-Typeを優先し、画像でなければ中身から判定
pub fn resolve_mime(content_type: Option<&str>, bytes: &[u8]) -> Option<String> {
    content_type
        .and_then(|ct| normalize_image_mime(ct).ok())
        .or_else(|| sniff_image_mime(bytes).map(str::to_string))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
