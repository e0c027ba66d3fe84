//! 類似度しきい値フィルタ
//!
//! 取得済みの結果に対してのみ適用し、AIへの再問い合わせは行わない

use crate::types::ProductMatch;

/// しきい値の初期値（%）
pub const DEFAULT_THRESHOLD: u8 = 50;

/// しきい値以上の結果のみ返す（順序は維持）
pub fn filter_by_threshold(matches: &[ProductMatch], threshold: u8) -> Vec<&ProductMatch> {
    let threshold = f64::from(threshold.min(100));
    matches
        .iter()
        .filter(|m| m.similarity_score >= threshold)
        .collect()
}

/// 表示件数の要約
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub showing: usize,
    pub total: usize,
}

impl FilterSummary {
    pub fn new(matches: &[ProductMatch], threshold: u8) -> Self {
        Self {
            showing: filter_by_threshold(matches, threshold).len(),
            total: matches.len(),
        }
    }

    /// しきい値で全件が隠れている
    pub fn all_hidden(&self) -> bool {
        self.showing == 0 && self.total > 0
    }
}

impl std::fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} showing", self.showing, self.total)
    }
}
