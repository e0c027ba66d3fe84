//! Product Lens Common Library
//!
//! 画像の入出力を伴わない共通ロジック（型・カタログ・プロンプト・パーサー・照合・セッション）

pub mod types;
pub mod catalog;
pub mod data_url;
pub mod error;
pub mod prompts;
pub mod parser;
pub mod reconciler;
pub mod filter;
pub mod session;

pub use types::{Product, ProductMatch, SimilarityResult, UploadedImage};
pub use catalog::{Catalog, CatalogSource};
pub use data_url::split_data_url;
pub use error::{Error, Result};
pub use prompts::{build_similarity_prompt, response_schema, MIN_REPORTED_SCORE};
pub use parser::{extract_json, parse_similarity_response};
pub use reconciler::reconcile;
pub use filter::{filter_by_threshold, FilterSummary, DEFAULT_THRESHOLD};
pub use session::{SearchPhase, Session, SessionError};
