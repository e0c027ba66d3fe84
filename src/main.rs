use clap::Parser;
use indicatif::ProgressBar;
use product_lens::{cli, config, error, fetch, gemini, pipeline, requester};
use product_lens_common::{Catalog, CatalogSource, ProductMatch, SearchPhase, Session};
use cli::{Cli, Commands};
use config::Config;
use error::{LensError, Result};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✖ {}", e.report());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Search { image, threshold, candidates, output } => {
            println!("🔍 product-lens - 類似商品検索\n");

            config.validate()?;
            // APIキーがなければここで終了
            let model = gemini::GeminiClient::new(&config)?;
            let model_name = model.model().to_string();
            let fetcher = fetch::HttpFetcher::from_config(&config)?;
            let requester = requester::SimilarityRequester::new(model, fetcher);
            let catalog = Catalog::generated();
            let candidate_count = candidates.unwrap_or(config.candidate_count).max(1);

            let mut session = Session::new();
            session.set_threshold(threshold.unwrap_or(config.default_threshold));

            // 1. 画像読込
            println!("[1/3] 画像を読み込み中...");
            let input = image.into_input().ok_or(LensError::EmptyUrl)?;
            pipeline::load_image(&mut session, input, requester.fetcher()).await?;
            if let Some(uploaded) = session.uploaded_image() {
                println!(
                    "✔ {} ({}, 約{} bytes)\n",
                    uploaded.source(),
                    uploaded.mime_type(),
                    uploaded.approx_byte_len()
                );
            }

            // 2. AI解析
            println!("[2/3] AI解析中... ({}, 候補{}件)", model_name, candidate_count);
            let spinner = ProgressBar::new_spinner();
            spinner.set_message("Analyzing your image and scanning our product database...");
            spinner.enable_steady_tick(Duration::from_millis(120));
            let phase = pipeline::run_search(&mut session, &catalog, &requester, candidate_count).await;
            spinner.finish_and_clear();

            match phase? {
                SearchPhase::Results => {
                    println!("✔ 解析完了\n");
                    println!("[3/3] 結果 (しきい値 {}%)", session.threshold());
                    print_matches(&session);
                }
                SearchPhase::NoMatches => {
                    println!("✔ 解析完了\n");
                    println!("{}", session.notice().unwrap_or_default());
                }
                // 表示するメッセージは LensError::Search と同じ
                _ => return Err(LensError::Search),
            }

            if let Some(path) = output {
                write_matches(&path, session.matches())?;
                println!("\n✔ 結果を保存: {}", path.display());
            }
        }

        Commands::Catalog { count } => {
            let catalog = Catalog::generated();
            println!("カタログ: 全{}件中 {}件を表示\n", catalog.len(), count.min(catalog.len()));
            for product in catalog.sample(count) {
                println!("  {:<12} {:<28} [{}]", product.id, product.name, product.category);
                println!("               {}", product.image_url);
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  候補商品数: {}", config.candidate_count);
                println!("  しきい値: {}%", config.default_threshold);
                println!("  タイムアウト: API {}秒 / 画像 {}秒", config.request_timeout_seconds, config.fetch_timeout_seconds);
                println!("  中継サーバー: {}", config.cors_proxy.as_deref().unwrap_or("なし"));
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn print_matches(session: &Session) {
    let visible = session.visible_matches();
    let summary = session.summary();
    println!("{}\n", summary);

    if summary.all_hidden() {
        println!("No Matches Found");
        println!("Try adjusting the similarity threshold or starting a new search with a different image.");
        return;
    }

    for m in visible {
        println!("  {:>5.1}%  {:<12} {} [{}]", m.similarity_score, m.id(), m.product.name, m.product.category);
        println!("          {}", m.justification);
    }
}

fn write_matches(path: &Path, matches: &[ProductMatch]) -> Result<()> {
    let json = serde_json::to_string_pretty(matches)?;
    std::fs::write(path, json)?;
    Ok(())
}
