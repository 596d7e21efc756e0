//! 料理写真の解析パイプライン
//!
//! 画像 → ラベル → 料理名 → メニュー照合 → おすすめ → （レシピ）
//!
//! 外部呼び出しはすべて期限付き。ステージが失敗したらメッセージを残し、
//! その結果に依存するステージだけを飛ばす。
//! - ラベル検出の失敗: 以降すべて
//! - 料理名の失敗: 照合とレシピ
//! - メニュー取得の失敗: 照合とおすすめ
//! - 照合の失敗: なし（MatchKind::Error として記録）
//!
//! 設定不備だけは呼び出し元へエラーとして返す。

pub mod cache;
pub mod llm;
pub mod vision;
mod types;

pub use cache::CacheFile;
pub use types::{DishName, DishReport};

use crate::config::Config;
use crate::deadline::with_deadline;
use crate::error::{DishMatchError, Result};
use crate::matcher::{match_dish, MenuCache, MenuStore};
use crate::normalizer::{clean_model_reply, normalize_label};
use crate::scanner::UploadedImage;
use dish_match_common::{
    build_dish_name_prompt, build_recipe_prompt, filter_recommendations, Customization,
    DetectedLabels, DietaryPreferenceSet, MatchResult, NO_MATCH_MESSAGE,
};
use llm::TextGenerator;
use std::path::Path;
use std::time::Duration;
use vision::LabelDetector;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub timeout: Duration,
    pub label_limit: usize,
    pub use_cache: bool,
    pub suggest_recipe: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            label_limit: config.label_limit,
            use_cache: false,
            suggest_recipe: false,
        }
    }
}

/// ラベル検出（上位 `limit` 件）
pub async fn detect_labels<D>(
    detector: &D,
    image: &UploadedImage,
    limit: usize,
    timeout: Duration,
) -> Result<DetectedLabels>
where
    D: LabelDetector + Clone + 'static,
{
    let detector = detector.clone();
    let bytes = image.bytes.clone();
    let raw = with_deadline("label_detection", timeout, async move { detector.detect(bytes).await }).await?;
    Ok(DetectedLabels::top(raw.iter().map(|l| normalize_label(l)), limit))
}

/// ラベルから料理名を推定
///
/// ラベルが空なら生成AIを呼ばずに `DishName::Unknown` を返す。
/// 生成AIの失敗や空応答はエラー（`Unknown` とは区別する）。
pub async fn name_dish<G>(generator: &G, labels: &DetectedLabels, timeout: Duration) -> Result<DishName>
where
    G: TextGenerator + Clone + 'static,
{
    if labels.is_empty() {
        return Ok(DishName::Unknown);
    }

    let prompt = build_dish_name_prompt(labels.as_slice());
    let generator = generator.clone();
    let reply = with_deadline("dish_name", timeout, async move { generator.generate(prompt).await }).await?;

    let name = clean_model_reply(&reply);
    if name.is_empty() {
        return Err(DishMatchError::ApiParse("料理名の応答が空です".into()));
    }
    Ok(DishName::Identified(name))
}

/// 料理名からレシピを提案
pub async fn suggest_recipe<G>(generator: &G, dish_name: &str, timeout: Duration) -> Result<String>
where
    G: TextGenerator + Clone + 'static,
{
    let prompt = build_recipe_prompt(dish_name);
    let generator = generator.clone();
    let reply = with_deadline("recipe", timeout, async move { generator.generate(prompt).await }).await?;

    let recipe = reply.trim();
    if recipe.is_empty() {
        return Err(DishMatchError::ApiParse("レシピの応答が空です".into()));
    }
    Ok(recipe.to_string())
}

/// 依存クライアントを外から受け取るパイプライン
pub struct DishPipeline<'a, D, G, S> {
    detector: &'a D,
    generator: &'a G,
    menu: &'a MenuCache<S>,
    options: PipelineOptions,
}

impl<'a, D, G, S> DishPipeline<'a, D, G, S>
where
    D: LabelDetector + Clone + 'static,
    G: TextGenerator + Clone + 'static,
    S: MenuStore + Clone + 'static,
{
    pub fn new(detector: &'a D, generator: &'a G, menu: &'a MenuCache<S>, options: PipelineOptions) -> Self {
        Self {
            detector,
            generator,
            menu,
            options,
        }
    }

    /// 1枚の写真を処理
    pub async fn run(
        &self,
        image: &UploadedImage,
        preferences: &DietaryPreferenceSet,
        customization: &Customization,
    ) -> Result<DishReport> {
        let mut report = DishReport::new(&image.file_name);
        let timeout = self.options.timeout;

        // 1. ラベル検出（失敗したら以降はすべて飛ばす）
        let labels = match self.labels_for(image).await {
            Ok(labels) => labels,
            Err(e) => {
                record_failure(&mut report, "ラベル検出", e)?;
                return Ok(report);
            }
        };
        tracing::info!(file = %image.file_name, labels = ?labels.as_slice(), "ラベル検出");
        report.labels = labels.as_slice().to_vec();

        // 2. 料理名推定
        let dish_name = match name_dish(self.generator, &labels, timeout).await {
            Ok(name) => {
                tracing::info!(dish = %name.as_str(), "料理名推定");
                report.dish_name = Some(name.as_str().to_string());
                Some(name)
            }
            Err(e) => {
                record_failure(&mut report, "料理名の推定", e)?;
                None
            }
        };

        // 3. メニュー取得
        let menu = match self.menu.get().await {
            Ok(menu) => Some(menu),
            Err(e) => {
                report.record_match(&MatchResult::error(e.to_string()));
                record_failure(&mut report, "メニューの取得", e)?;
                None
            }
        };

        // 4. メニュー照合（料理名とメニューの両方が必要）
        if let (Some(dish_name), Some(menu)) = (&dish_name, &menu) {
            match dish_name {
                DishName::Unknown => report.record_match(&MatchResult::no_match(NO_MATCH_MESSAGE, "")),
                DishName::Identified(name) => match match_dish(self.generator, name, menu, timeout).await {
                    Ok(result) => report.record_match(&result),
                    Err(e) => {
                        report.record_match(&MatchResult::error(e.to_string()));
                        record_failure(&mut report, "メニュー照合", e)?;
                    }
                },
            }
        }

        // 5. おすすめ（メニューだけに依存）
        if let Some(menu) = &menu {
            report.recommendations = filter_recommendations(menu, preferences, customization);
        }

        // 6. レシピ（料理名だけに依存）
        if self.options.suggest_recipe {
            if let Some(DishName::Identified(name)) = &dish_name {
                match suggest_recipe(self.generator, name, timeout).await {
                    Ok(recipe) => report.recipe = Some(recipe),
                    Err(e) => record_failure(&mut report, "レシピ提案", e)?,
                }
            }
        }

        Ok(report)
    }

    async fn labels_for(&self, image: &UploadedImage) -> Result<DetectedLabels> {
        let limit = self.options.label_limit;

        if !self.options.use_cache {
            return detect_labels(self.detector, image, limit, self.options.timeout).await;
        }

        let folder = image.path.parent().unwrap_or(Path::new("."));
        let mut cache = CacheFile::load(folder);
        let hash = cache::compute_content_hash(&image.bytes);

        if let Some(labels) = cache.get(&hash) {
            tracing::debug!(file = %image.file_name, "ラベルキャッシュ使用");
            return Ok(DetectedLabels::top(labels.iter().cloned(), limit));
        }

        let labels = detect_labels(self.detector, image, limit, self.options.timeout).await?;
        cache.insert(hash, image.file_name.clone(), labels.as_slice().to_vec());
        if let Err(e) = cache.save(folder) {
            tracing::warn!("ラベルキャッシュの保存に失敗: {}", e);
        }
        Ok(labels)
    }
}

/// ステージ失敗: 設定不備は上へ、それ以外はメッセージとして残す
fn record_failure(report: &mut DishReport, stage: &str, err: DishMatchError) -> Result<()> {
    if err.is_fatal() {
        return Err(err);
    }
    tracing::warn!(file = %report.file_name, stage, "ステージ失敗: {}", err);
    report.messages.push(format!("{}に失敗しました: {}", stage, err));
    Ok(())
}
