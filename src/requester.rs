//! 類似度リクエスト
//!
//! ユーザー画像と候補商品の画像をまとめて1回のリクエストでAIへ送り、
//! 類似度判定の配列を受け取る。

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{LensError, Result};
use crate::fetch::ImageFetcher;
use crate::gemini::{GenerateRequest, Part, SimilarityModel};
use crate::normalizer;
use product_lens_common::{
    build_similarity_prompt, parse_similarity_response, response_schema, Product,
    SimilarityResult, UploadedImage,
};

pub struct SimilarityRequester<M, F> {
    model: M,
    fetcher: F,
}

impl<M, F> SimilarityRequester<M, F>
where
    M: SimilarityModel,
    F: ImageFetcher,
{
    pub fn new(model: M, fetcher: F) -> Self {
        Self { model, fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// 候補ごとの類似度をAIから取得
    ///
    /// 画像を取得できなかった候補は黙って除外する（全件失敗でもユーザー画像だけで問い合わせる）。
    /// 呼び出し・パースの失敗は `LensError::Search` にまとめる。
    #[instrument(skip_all, fields(source = user_image.source(), candidates = candidates.len()))]
    pub async fn find_similar(
        &self,
        user_image: &UploadedImage,
        candidates: &[Product],
    ) -> Result<Vec<SimilarityResult>> {
        let acquired = self.acquire_candidates(candidates).await;
        if acquired.is_empty() && !candidates.is_empty() {
            warn!("候補画像を1件も取得できませんでした");
        }

        let request = build_request(user_image, candidates, &acquired);
        debug!("リクエスト: 画像{}枚", request.image_count());

        let text = self.model.generate(&request).await.map_err(|e| {
            error!("Gemini API呼び出しエラー: {}", e);
            LensError::Search
        })?;

        let results = parse_similarity_response(&text).map_err(|e| {
            error!("レスポンス検証エラー: {}", e);
            LensError::Search
        })?;

        info!("類似度 {}件を受信", results.len());
        Ok(results)
    }

    /// 候補画像を並行取得（順序は候補リストのまま）
    async fn acquire_candidates<'a>(&self, candidates: &'a [Product]) -> Vec<(&'a Product, UploadedImage)> {
        let fetches = candidates.iter().map(|product| async move {
            let image = normalizer::from_url(&product.image_url, &self.fetcher).await;
            (product, image)
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(product, image)| match image {
                Ok(image) => Some((product, image)),
                Err(e) => {
                    warn!("商品 {} の画像を取得できないためスキップ: {}", product.id, e);
                    None
                }
            })
            .collect()
    }
}

/// ユーザー画像、候補画像（候補順）、指示文の順にパートを並べる
///
/// 指示文には画像を取得できなかったものも含め、全候補のIDを並べる
pub fn build_request(
    user_image: &UploadedImage,
    candidates: &[Product],
    acquired: &[(&Product, UploadedImage)],
) -> GenerateRequest {
    let ids: Vec<&str> = candidates.iter().map(|p| p.id.as_str()).collect();

    let mut parts = Vec::with_capacity(acquired.len() + 2);
    parts.push(Part::image(user_image));
    parts.extend(acquired.iter().map(|(_, image)| Part::image(image)));
    parts.push(Part::text(build_similarity_prompt(&ids)));

    GenerateRequest::json(parts, response_schema())
}
