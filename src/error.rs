use thiserror::Error;

/// 検索失敗時にユーザーへ表示するメッセージ
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to get similarity results from the AI model.";

#[derive(Error, Debug)]
pub enum LensError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 GEMINI_API_KEY または `product-lens config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    /// ファイル選択/ドロップ時のMIMEタイプ不正（読込前に判定）
    #[error("画像ファイルではありません: {source_name} ({mime_type})")]
    InvalidImageType {
        source_name: String,
        mime_type: String,
        dropped: bool,
    },

    #[error("画像URLが入力されていません")]
    EmptyUrl,

    #[error("画像読み込みエラー: {source_name}: {reason}")]
    ImageRead {
        source_name: String,
        reason: String,
        dropped: bool,
    },

    #[error("画像取得エラー: {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("API呼び出しエラー (status {status}): {message}")]
    ApiCall { status: u16, message: String },

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    /// 類似度検索の失敗（原因はログに出し、ユーザーには一律のメッセージ）
    #[error("Failed to get similarity results from the AI model.")]
    Search,

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Session(#[from] product_lens_common::SessionError),
}

impl LensError {
    /// 画面に出す短いメッセージ
    pub fn user_message(&self) -> String {
        match self {
            LensError::InvalidImageType { dropped: false, .. } => {
                "Please select a valid image file.".into()
            }
            LensError::InvalidImageType { dropped: true, .. } => {
                "Please drop a valid image file.".into()
            }
            LensError::ImageRead { dropped: false, .. } => "Failed to read image file.".into(),
            LensError::ImageRead { dropped: true, .. } => {
                "Failed to read dropped image file.".into()
            }
            LensError::EmptyUrl => "Please enter an image URL.".into(),
            LensError::ImageFetch { .. } | LensError::Timeout(_) => {
                "Failed to fetch image from URL. Please check the URL and CORS policy.".into()
            }
            LensError::Search | LensError::ApiCall { .. } | LensError::ApiParse(_) => {
                SEARCH_FAILED_MESSAGE.into()
            }
            other => other.to_string(),
        }
    }

    /// 起動時に解消すべき致命的なエラー
    pub fn is_fatal(&self) -> bool {
        matches!(self, LensError::MissingApiKey | LensError::Config(_))
    }

    /// 終了時に1行で表示する内容（致命的なエラーは対処方法を含む詳細）
    pub fn report(&self) -> String {
        if self.is_fatal() {
            self.to_string()
        } else {
            self.user_message()
        }
    }
}

pub type Result<T> = std::result::Result<T, LensError>;
