//! プロンプト生成モジュール
//!
//! 類似度判定の指示文と、AIに課す出力スキーマ

use serde_json::{json, Value};

/// この値を超えるスコアのみ返すようAIに指示する
pub const MIN_REPORTED_SCORE: u32 = 20;

/// 類似度判定プロンプト生成
///
/// 画像パートはユーザー画像、候補画像の順に並ぶ前提
///
/// # Arguments
/// * `candidate_ids` - 候補商品ID（画像と同じ順序）
pub fn build_similarity_prompt(candidate_ids: &[&str]) -> String {
    let ids = candidate_ids.join(", ");

    format!(
        r#"You are a visual product matching expert. Analyze the main subject in the first image provided (the user's image).
Then, for each of the subsequent product images, provide a similarity score from 0 to 100 of how visually similar it is to the user's image.
A score of 100 means it's nearly identical. A score of 0 means it's completely different.
Also, provide a brief, one-sentence justification for each score.
The product IDs are: {ids}.
Return the results as a JSON array matching the provided schema. Only include products with a similarity score greater than {min}."#,
        min = MIN_REPORTED_SCORE,
    )
}

/// 出力スキーマ（Gemini の responseSchema 形式）
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "productId": {
                    "type": "STRING",
                    "description": "The unique ID of the product being compared."
                },
                "similarityScore": {
                    "type": "NUMBER",
                    "description": "A score from 0 to 100 indicating visual similarity. 100 is a perfect match."
                },
                "justification": {
                    "type": "STRING",
                    "description": "A brief explanation for the similarity score."
                }
            },
            "required": ["productId", "similarityScore", "justification"]
        }
    })
}
