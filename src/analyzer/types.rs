use dish_match_common::{MatchKind, MatchResult, MenuItem, Recommendation, UNKNOWN_DISH};
use serde::{Deserialize, Serialize};

/// 料理名推定の結果
///
/// ラベルなしは `Unknown`。モデルが "Unknown dish" と答えた場合は `Identified`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DishName {
    Identified(String),
    Unknown,
}

impl DishName {
    pub fn as_str(&self) -> &str {
        match self {
            DishName::Identified(name) => name,
            DishName::Unknown => UNKNOWN_DISH,
        }
    }
}

/// 1枚の写真に対する処理結果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishReport {
    pub file_name: String,

    #[serde(default)]
    pub labels: Vec<String>,          // 検出ラベル

    #[serde(default)]
    pub dish_name: Option<String>,    // 推定料理名

    #[serde(default)]
    pub match_kind: Option<MatchKind>,

    #[serde(default)]
    pub matched_item: Option<MenuItem>,

    #[serde(default)]
    pub match_message: String,

    #[serde(default)]
    pub raw_model_text: String,       // 照合時のモデル応答（未加工）

    #[serde(default)]
    pub recommendations: Vec<Recommendation>,

    #[serde(default)]
    pub recipe: Option<String>,

    #[serde(default)]
    pub messages: Vec<String>,        // ステージ失敗時の表示用メッセージ
}

impl DishReport {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn record_match(&mut self, result: &MatchResult<'_>) {
        self.match_kind = Some(result.kind);
        self.matched_item = result.matched_item.cloned();
        self.match_message = result.message.clone();
        self.raw_model_text = result.raw_model_text.clone();
    }

    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }
}
