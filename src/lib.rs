//! Product Lens
//!
//! 画像の取得・正規化、Gemini API呼び出し、検索フローを提供する。
//! 純粋なロジックは `product_lens_common` にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gemini;
pub mod normalizer;
pub mod pipeline;
pub mod requester;

pub use error::{LensError, Result};
pub use fetch::{FetchedImage, HttpFetcher, ImageFetcher};
pub use gemini::{GeminiClient, GenerateRequest, SimilarityModel};
pub use normalizer::ImageInput;
pub use requester::SimilarityRequester;
