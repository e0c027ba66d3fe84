use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::normalizer::ImageInput;

#[derive(Parser)]
#[command(name = "product-lens")]
#[command(about = "画像から類似商品を探すビジュアル検索ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像に似た商品をカタログから探す
    Search {
        #[command(flatten)]
        image: ImageArgs,

        /// 類似度しきい値（0-100、省略時は設定値）
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,

        /// AIへ送る候補商品数（省略時は設定値）
        #[arg(short, long)]
        candidates: Option<usize>,

        /// 全結果をJSONで保存
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// カタログからランダムに商品を表示
    Catalog {
        /// 表示件数
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 検索画像の指定（ファイルかURLのどちらか）
#[derive(Args)]
pub struct ImageArgs {
    /// 画像ファイルのパス
    #[arg(short, long, required_unless_present = "url", conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// 画像URL（Data URLも可）
    #[arg(short, long)]
    pub url: Option<String>,

    /// ファイルのMIMEタイプを明示（ドラッグ&ドロップ相当）
    #[arg(long, requires = "file")]
    pub mime: Option<String>,
}

impl ImageArgs {
    pub fn into_input(self) -> Option<ImageInput> {
        match (self.file, self.url, self.mime) {
            (Some(path), _, Some(mime_type)) => Some(ImageInput::Dropped { path, mime_type }),
            (Some(path), _, None) => Some(ImageInput::File(path)),
            (None, Some(url), _) => Some(ImageInput::Url(url)),
            (None, None, _) => None,
        }
    }
}
