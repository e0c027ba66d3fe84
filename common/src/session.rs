//! 検索セッションの状態遷移
//!
//! Idle → ImageReady → Searching → Results | NoMatches | Failed、reset で Idle に戻る。
//! 検索中は新しいアップロードも二重の検索も受け付けない。

use thiserror::Error;

use crate::filter::{filter_by_threshold, FilterSummary, DEFAULT_THRESHOLD};
use crate::types::{ProductMatch, UploadedImage};

/// 画像がない状態で検索した場合のメッセージ
pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";

/// 結果0件の場合のメッセージ（エラーではない）
pub const NO_MATCHES_MESSAGE: &str = "Could not find any similar products. Try a different image.";

/// セッションのフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    ImageReady,
    Searching,
    Results,
    NoMatches,
    Failed,
}

impl SearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPhase::Idle => "idle",
            SearchPhase::ImageReady => "image-ready",
            SearchPhase::Searching => "searching",
            SearchPhase::Results => "results",
            SearchPhase::NoMatches => "no-matches",
            SearchPhase::Failed => "failed",
        }
    }
}

/// 不正な状態遷移
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please upload an image first.")]
    NoImage,

    #[error("検索中は操作できません")]
    SearchInFlight,

    #[error("検索中ではありません（現在: {0:?}）")]
    NotSearching(SearchPhase),
}

/// 1ユーザー分の検索セッション
#[derive(Debug, Clone)]
pub struct Session {
    phase: SearchPhase,
    uploaded_image: Option<UploadedImage>,
    matches: Vec<ProductMatch>,
    is_loading: bool,
    error: Option<String>,
    notice: Option<String>,
    upload_error: Option<String>,
    threshold: u8,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: SearchPhase::Idle,
            uploaded_image: None,
            matches: Vec::new(),
            is_loading: false,
            error: None,
            notice: None,
            upload_error: None,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn uploaded_image(&self) -> Option<&UploadedImage> {
        self.uploaded_image.as_ref()
    }

    /// しきい値適用前の全結果（スコア降順）
    pub fn matches(&self) -> &[ProductMatch] {
        &self.matches
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// 検索エラーのメッセージ
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// エラーではない通知（結果0件など）
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// 画像の読込・検証エラー
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// 新しい画像を設定し、前回の結果とエラーを消去
    pub fn upload(&mut self, image: UploadedImage) -> Result<(), SessionError> {
        if self.phase == SearchPhase::Searching {
            return Err(SessionError::SearchInFlight);
        }

        self.uploaded_image = Some(image);
        self.matches.clear();
        self.error = None;
        self.notice = None;
        self.upload_error = None;
        self.phase = SearchPhase::ImageReady;
        Ok(())
    }

    /// ユーザー画像の検証・取得に失敗（フェーズと画像は変更しない）
    pub fn reject_upload(&mut self, message: impl Into<String>) {
        self.upload_error = Some(message.into());
    }

    /// 検索開始。検索対象の画像を返す
    pub fn begin_search(&mut self) -> Result<UploadedImage, SessionError> {
        if self.phase == SearchPhase::Searching {
            return Err(SessionError::SearchInFlight);
        }
        let Some(image) = self.uploaded_image.clone() else {
            self.error = Some(NO_IMAGE_MESSAGE.to_string());
            return Err(SessionError::NoImage);
        };

        self.matches.clear();
        self.error = None;
        self.notice = None;
        self.is_loading = true;
        self.phase = SearchPhase::Searching;
        Ok(image)
    }

    /// 検索完了。結果の有無・成否に応じてフェーズを確定する
    pub fn complete_search(
        &mut self,
        outcome: Result<Vec<ProductMatch>, String>,
    ) -> Result<SearchPhase, SessionError> {
        if self.phase != SearchPhase::Searching {
            return Err(SessionError::NotSearching(self.phase));
        }

        self.is_loading = false;
        self.phase = match outcome {
            Ok(matches) if matches.is_empty() => {
                self.notice = Some(NO_MATCHES_MESSAGE.to_string());
                SearchPhase::NoMatches
            }
            Ok(matches) => {
                self.matches = matches;
                SearchPhase::Results
            }
            Err(message) => {
                self.matches.clear();
                self.error = Some(if message.trim().is_empty() {
                    "An unknown error occurred while searching for products.".to_string()
                } else {
                    message
                });
                SearchPhase::Failed
            }
        };
        Ok(self.phase)
    }

    /// すべて消去して Idle に戻る
    pub fn reset(&mut self) {
        let threshold = self.threshold;
        *self = Self::new();
        self.threshold = threshold;
    }

    /// しきい値を変更（0〜100に丸める）
    pub fn set_threshold(&mut self, threshold: u8) {
        self.threshold = threshold.min(100);
    }

    /// しきい値を適用した表示対象
    pub fn visible_matches(&self) -> Vec<&ProductMatch> {
        filter_by_threshold(&self.matches, self.threshold)
    }

    pub fn summary(&self) -> FilterSummary {
        FilterSummary::new(&self.matches, self.threshold)
    }
}
