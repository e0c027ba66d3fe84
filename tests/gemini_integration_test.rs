//! Gemini API 実接続テスト（GEMINI_API_KEY がなければスキップ）

use product_lens::config::Config;
use product_lens::requester::build_request;
use product_lens::{GeminiClient, SimilarityModel};
use product_lens_common::{parse_similarity_response, Product, UploadedImage};

/// 1x1 PNG（白）
const WHITE_PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8/5+hHgAHggJ/PchI7wAAAABJRU5ErkJggg==";

#[tokio::test]
async fn gemini_similarity_integration() {
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {}
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping integration test");
            return;
        }
    }

    let client = GeminiClient::new(&Config::default()).expect("client build failed");
    let user = UploadedImage::from_data_url(WHITE_PIXEL, "user.png").expect("invalid data url");
    let candidate = user.clone();
    let product = Product {
        id: "product-1".into(),
        name: "White Square".into(),
        category: "Home Goods".into(),
        image_url: WHITE_PIXEL.into(),
    };

    let request = build_request(&user, std::slice::from_ref(&product), &[(&product, candidate)]);
    let text = client.generate(&request).await.expect("gemini api failed");

    let results = parse_similarity_response(&text).expect("failed to parse similarity response");
    for result in &results {
        assert_eq!(result.product_id, "product-1");
        assert!((0.0..=100.0).contains(&result.similarity_score));
    }
}
