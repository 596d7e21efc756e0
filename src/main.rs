use clap::Parser;
use dish_match::analyzer::llm::LlmClient;
use dish_match::analyzer::vision::GoogleVisionClient;
use dish_match::analyzer::{CacheFile, DishPipeline, DishReport, PipelineOptions};
use dish_match::cli::{Cli, Commands, MenuArgs, OutputArgs};
use dish_match::config::Config;
use dish_match::matcher::{match_dish, MenuCache, MenuSource};
use dish_match::{logging, render, scanner};
use dish_match_common::{filter_recommendations, MatchResult};

fn build_menu_cache(config: &Config, args: &MenuArgs) -> dish_match::error::Result<MenuCache<MenuSource>> {
    let source = MenuSource::from_config(config, args.menu.as_deref())?;
    Ok(MenuCache::new(source, config.menu_ttl(), config.timeout()))
}

fn emit_reports(reports: &[DishReport], out: &OutputArgs) -> anyhow::Result<()> {
    if out.json {
        let json = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])?
        } else {
            serde_json::to_string_pretty(reports)?
        };
        println!("{}", json);
    } else {
        for report in reports {
            println!("{}", render::format_report(report));
        }
    }

    if let Some(path) = &out.output {
        let json = serde_json::to_string_pretty(reports)?;
        std::fs::write(path, json)?;
        println!("✔ 結果を保存: {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    let config = Config::load()?;
    tracing::debug!(?config, "設定読み込み");

    match cli.command {
        Commands::Identify { image, menu, prefs, out, use_cache, recipe } => {
            if !out.json {
                println!("🍽 dish-match - 料理判定\n");
            }

            // 画像形式の検証はパイプラインより前
            let image = scanner::load_image(&image)?;

            let detector = GoogleVisionClient::new(config.vision_api_key()?, config.label_limit);
            let generator = LlmClient::from_config(&config, cli.ai_provider)?;
            let menu_cache = build_menu_cache(&config, &menu)?;

            let mut options = PipelineOptions::from_config(&config);
            options.use_cache = use_cache;
            options.suggest_recipe = recipe;

            let pipeline = DishPipeline::new(&detector, &generator, &menu_cache, options);
            let report = pipeline
                .run(&image, &prefs.preferences(), &prefs.customization())
                .await?;

            emit_reports(&[report], &out)?;
        }

        Commands::Batch { folder, menu, prefs, out, use_cache } => {
            if !out.json {
                println!("🍽 dish-match - 一括判定\n");
            }

            let images = scanner::scan_folder(&folder)?;
            if !out.json {
                println!("✔ {}枚の写真を検出\n", images.len());
            }

            let detector = GoogleVisionClient::new(config.vision_api_key()?, config.label_limit);
            let generator = LlmClient::from_config(&config, cli.ai_provider)?;
            let menu_cache = build_menu_cache(&config, &menu)?;

            let mut options = PipelineOptions::from_config(&config);
            options.use_cache = use_cache;

            let pipeline = DishPipeline::new(&detector, &generator, &menu_cache, options);
            let preferences = prefs.preferences();
            let customization = prefs.customization();

            let mut reports = Vec::with_capacity(images.len());
            for (index, info) in images.iter().enumerate() {
                if cli.verbose && !out.json {
                    println!("  [{}/{}] {}", index + 1, images.len(), info.file_name);
                }

                let report = match scanner::load_image(&info.path) {
                    Ok(image) => pipeline.run(&image, &preferences, &customization).await?,
                    Err(e) => {
                        tracing::warn!(file = %info.file_name, "画像をスキップ: {}", e);
                        let mut report = DishReport::new(&info.file_name);
                        report.messages.push(e.to_string());
                        report
                    }
                };
                reports.push(report);
            }

            emit_reports(&reports, &out)?;

            let failed = reports.iter().filter(|r| r.has_errors()).count();
            if failed > 0 && !out.json {
                println!("⚠ {}/{}枚で処理に失敗しました", failed, reports.len());
            }
        }

        Commands::Match { dish_name, menu, json } => {
            let generator = LlmClient::from_config(&config, cli.ai_provider)?;
            let menu_cache = build_menu_cache(&config, &menu)?;

            let items = menu_cache.get().await?;
            let result = match match_dish(&generator, &dish_name, &items, config.timeout()).await {
                Ok(result) => result,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => MatchResult::error(e.to_string()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render::format_match(&result));
            }
        }

        Commands::Recommend { menu, prefs, json } => {
            let menu_cache = build_menu_cache(&config, &menu)?;
            let items = menu_cache.get().await?;
            let recommendations =
                filter_recommendations(&items, &prefs.preferences(), &prefs.customization());

            if json {
                println!("{}", serde_json::to_string_pretty(&recommendations)?);
            } else {
                print!("{}", render::format_recommendations(&recommendations));
            }
        }

        Commands::Config {
            set_vision_key,
            set_llm_key,
            set_firebase_project,
            set_firebase_key,
            set_timeout,
            show,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(key) = set_vision_key {
                config.vision_api_key = Some(key);
                changed = true;
            }
            if let Some(key) = set_llm_key {
                match cli.ai_provider {
                    dish_match::ai_provider::AiProvider::Gemini => config.gemini_api_key = Some(key),
                    dish_match::ai_provider::AiProvider::OpenAi => config.openai_api_key = Some(key),
                }
                changed = true;
            }
            if let Some(project) = set_firebase_project {
                config.firebase_project_id = Some(project);
                changed = true;
            }
            if let Some(key) = set_firebase_key {
                config.firebase_api_key = Some(key);
                changed = true;
            }
            if let Some(seconds) = set_timeout {
                config.timeout_seconds = seconds;
                changed = true;
            }

            if changed {
                config.validate()?;
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                let status = |ok: bool| if ok { "設定済み" } else { "未設定" };
                println!("設定:");
                println!("  生成AI: {} ({})", cli.ai_provider.display_name(), config.llm_model(cli.ai_provider));
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  ラベル件数: {}", config.label_limit);
                println!("  メニューキャッシュ: {}秒", config.menu_ttl_seconds);
                println!("  メニューコレクション: {}", config.menu_collection);
                println!("  Vision APIキー: {}", status(config.vision_api_key().is_ok()));
                println!("  生成AI APIキー: {}", status(config.llm_api_key(cli.ai_provider).is_ok()));
                println!("  Firebase: {}", status(config.firebase().is_ok()));
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| std::path::PathBuf::from("."));
            let cache_path = CacheFile::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
