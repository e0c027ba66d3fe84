//! 類似度判定と候補商品の照合
//!
//! AIの結果をIDで商品に結合し、スコア降順に並べる（I/Oなしの純粋関数）

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{Product, ProductMatch, SimilarityResult};

/// 類似度判定を候補商品へ結合してスコア降順に並べる
///
/// - 候補にないIDは捨てる
/// - 同じIDが複数返った場合はスコアの高い方を採用
/// - 同点は候補リストの順序で並べるため、`results` の並び順は出力に影響しない
pub fn reconcile(results: &[SimilarityResult], candidates: &[Product]) -> Vec<ProductMatch> {
    // id -> 候補内の位置
    let position: HashMap<&str, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();

    let mut best: HashMap<usize, &SimilarityResult> = HashMap::new();
    for result in results {
        let Some(&idx) = position.get(result.product_id.as_str()) else {
            continue;
        };
        best.entry(idx)
            .and_modify(|current| {
                if result.similarity_score > current.similarity_score {
                    *current = result;
                }
            })
            .or_insert(result);
    }

    let mut ranked: Vec<(usize, &SimilarityResult)> = best.into_iter().collect();
    ranked.sort_by(|(ia, a), (ib, b)| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(Ordering::Equal)
            .then(ia.cmp(ib))
    });

    ranked
        .into_iter()
        .map(|(idx, result)| ProductMatch {
            product: candidates[idx].clone(),
            similarity_score: result.similarity_score,
            justification: result.justification.clone(),
        })
        .collect()
}
