//! APIレスポンスパーサー
//!
//! AIのテキスト出力からJSONを抽出し、類似度判定の配列として検証する

use crate::error::{Error, Result};
use crate::types::SimilarityResult;

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の [...] 配列
/// 3. エラー
///
/// # Examples
/// ```
/// use product_lens_common::extract_json;
///
/// let response = "[{\"productId\": \"product-1\"}]";
/// let json = extract_json(response).unwrap();
/// assert!(json.contains("productId"));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7;
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の [...] を探す
    if let Some(start) = response.find('[') {
        if let Some(end) = response.rfind(']') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 類似度レスポンスをパース
///
/// 3フィールドすべて必須。1件でも不正なら全体を失敗とし、部分的な結果は返さない。
///
/// # Returns
/// * `Ok(Vec<SimilarityResult>)` - 検証済みの結果（順序はAIの出力順）
/// * `Err` - JSONが見つからない、型が違う、スコアが範囲外
pub fn parse_similarity_response(response: &str) -> Result<Vec<SimilarityResult>> {
    let json_str = extract_json(response.trim())?;
    let results: Vec<SimilarityResult> = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("類似度 JSONパースエラー: {}", e)))?;

    for (i, result) in results.iter().enumerate() {
        validate(i, result)?;
    }

    Ok(results)
}

fn validate(index: usize, result: &SimilarityResult) -> Result<()> {
    if result.product_id.trim().is_empty() {
        return Err(Error::Parse(format!("{}件目: productIdが空です", index + 1)));
    }

    let score = result.similarity_score;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(Error::Parse(format!(
            "{}件目 ({}): similarityScoreが範囲外です: {}",
            index + 1,
            result.product_id,
            score
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_with_block() {
        let response = r#"Here are the matches:
```json
[
  {"productId": "product-1", "similarityScore": 88, "justification": "Same shape."}
]
```
Done."#;

        let json = extract_json(response).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("product-1"));
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Result: [{"productId": "p"}] end"#;
        assert_eq!(extract_json(response).unwrap(), r#"[{"productId": "p"}]"#);
    }

    #[test]
    fn test_extract_json_error() {
        assert!(extract_json("no json here").is_err());
    }

    #[test]
    fn test_parse_valid_response() {
        let response = r#"[
            {"productId": "product-1", "similarityScore": 90, "justification": "Nearly identical jacket."},
            {"productId": "product-2", "similarityScore": 40.5, "justification": "Similar color."}
        ]"#;

        let results = parse_similarity_response(response).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].product_id, "product-1");
        assert_eq!(results[0].similarity_score, 90.0);
        assert_eq!(results[1].similarity_score, 40.5);
    }

    #[test]
    fn test_parse_empty_array() {
        let results = parse_similarity_response("[]").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_missing_field() {
        let response = r#"[{"productId": "product-1", "similarityScore": 90}]"#;
        assert!(matches!(parse_similarity_response(response), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_wrong_type() {
        let response = r#"[{"productId": "product-1", "similarityScore": "high", "justification": "x"}]"#;
        assert!(parse_similarity_response(response).is_err());
    }

    #[test]
    fn test_parse_out_of_range_score() {
        let response = r#"[{"productId": "product-1", "similarityScore": 140, "justification": "x"}]"#;
        let err = parse_similarity_response(response).unwrap_err();
        assert!(err.to_string().contains("範囲外"));
    }

    #[test]
    fn test_parse_empty_id() {
        let response = r#"[{"productId": " ", "similarityScore": 50, "justification": "x"}]"#;
        assert!(parse_similarity_response(response).is_err());
    }

    #[test]
    fn test_parse_object_instead_of_array() {
        let response = r#"{"productId": "product-1", "similarityScore": 50, "justification": "x"}"#;
        assert!(parse_similarity_response(response).is_err());
    }

    #[test]
    fn test_one_bad_entry_fails_whole_response() {
        let response = r#"[
            {"productId": "product-1", "similarityScore": 90, "justification": "ok"},
            {"productId": "product-2", "justification": "missing score"}
        ]"#;
        assert!(parse_similarity_response(response).is_err());
    }
}
