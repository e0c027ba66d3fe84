//! 画像読込から検索完了までの流れ
//!
//! セッションの状態遷移は必ずここを通す。検索を開始したら、成功・0件・失敗の
//! いずれかで必ず完了させる。

use tracing::{error, info, instrument};

use crate::error::Result;
use crate::fetch::ImageFetcher;
use crate::gemini::SimilarityModel;
use crate::normalizer::{self, ImageInput};
use crate::requester::SimilarityRequester;
use product_lens_common::{reconcile, CatalogSource, SearchPhase, Session};

/// 画像を正規化してセッションへ設定
///
/// 失敗時はセッションにメッセージを記録し、エラーも返す
pub async fn load_image(
    session: &mut Session,
    input: ImageInput,
    fetcher: &dyn ImageFetcher,
) -> Result<()> {
    match normalizer::normalize(input, fetcher).await {
        Ok(image) => {
            info!("画像を設定: {} ({})", image.source(), image.mime_type());
            session.upload(image)?;
            Ok(())
        }
        Err(e) => {
            session.reject_upload(e.user_message());
            Err(e)
        }
    }
}

/// 候補を抽出して検索し、結果をセッションへ反映
///
/// 戻り値は確定したフェーズ。検索自体の失敗は `Failed` として返す
#[instrument(skip_all, fields(candidates = candidate_count))]
pub async fn run_search<C, M, F>(
    session: &mut Session,
    catalog: &C,
    requester: &SimilarityRequester<M, F>,
    candidate_count: usize,
) -> Result<SearchPhase>
where
    C: CatalogSource + ?Sized,
    M: SimilarityModel,
    F: ImageFetcher,
{
    let image = session.begin_search()?;
    let candidates = catalog.sample(candidate_count);

    let outcome = match requester.find_similar(&image, &candidates).await {
        Ok(results) => Ok(reconcile(&results, &candidates)),
        Err(e) => {
            error!("検索失敗: {}", e);
            Err(e.user_message())
        }
    };

    let phase = session.complete_search(outcome)?;
    info!("検索完了: {}", phase.as_str());
    Ok(phase)
}
