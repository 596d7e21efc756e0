//! 料理照合の型定義
//!
//! CLIと外部クライアントで共有される型:
//! - MenuItem: メニューストアの1件
//! - DetectedLabels: 画像ラベル（上位N件）
//! - MatchResult: メニュー照合の結果
//! - DietaryPreference / Recommendation: 食事制限フィルタの入出力

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// ラベル検出で使う上位件数
pub const DEFAULT_LABEL_LIMIT: usize = 5;

/// メニュー項目（ストア側が所有、パイプラインからは読み取り専用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub ingredients: Vec<String>,

    #[serde(default, alias = "dietary_tags", alias = "tags")]
    pub dietary_tags: Vec<String>,
}

impl MenuItem {
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// タグを大文字小文字無視で含むか
    pub fn has_tag(&self, tag: &str) -> bool {
        self.dietary_tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag.trim()))
    }
}

/// 画像から検出されたラベル（順序付き、上位N件）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectedLabels(Vec<String>);

impl DetectedLabels {
    /// 空白ラベルを除き、先頭から`limit`件だけ保持
    pub fn top<I, S>(labels: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels
            .into_iter()
            .map(Into::into)
            .map(|s: String| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(limit)
            .collect();
        Self(labels)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// 照合結果の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    ExactMatch,
    SimilarMatch,
    NoMatch,
    Error,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::ExactMatch => write!(f, "exact match"),
            MatchKind::SimilarMatch => write!(f, "similar match"),
            MatchKind::NoMatch => write!(f, "no match"),
            MatchKind::Error => write!(f, "error"),
        }
    }
}

/// メニュー照合の結果
///
/// `matched_item` は照合に渡したメニュー列の要素を借用する。
/// 渡していない項目が一致として返ることはない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult<'a> {
    pub matched_item: Option<&'a MenuItem>,
    pub kind: MatchKind,
    pub message: String,
    pub raw_model_text: String,
}

impl<'a> MatchResult<'a> {
    pub fn matched(item: &'a MenuItem, kind: MatchKind, raw_model_text: &str) -> Self {
        Self {
            matched_item: Some(item),
            kind,
            message: item.name.clone(),
            raw_model_text: raw_model_text.to_string(),
        }
    }

    pub fn no_match(message: impl Into<String>, raw_model_text: &str) -> Self {
        Self {
            matched_item: None,
            kind: MatchKind::NoMatch,
            message: message.into(),
            raw_model_text: raw_model_text.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            matched_item: None,
            kind: MatchKind::Error,
            message: message.into(),
            raw_model_text: String::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched_item.is_some()
    }
}

/// 食事制限（固定の列挙）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DietaryPreference {
    Vegan,
    Vegetarian,
    GlutenFree,
    Keto,
    DairyFree,
    LowSugar,
    NoPreference,
}

impl DietaryPreference {
    pub const ALL: [DietaryPreference; 7] = [
        DietaryPreference::Vegan,
        DietaryPreference::Vegetarian,
        DietaryPreference::GlutenFree,
        DietaryPreference::Keto,
        DietaryPreference::DairyFree,
        DietaryPreference::LowSugar,
        DietaryPreference::NoPreference,
    ];

    /// 表示名（メニューのタグと大文字小文字無視で比較される）
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryPreference::Vegan => "Vegan",
            DietaryPreference::Vegetarian => "Vegetarian",
            DietaryPreference::GlutenFree => "Gluten-Free",
            DietaryPreference::Keto => "Keto",
            DietaryPreference::DairyFree => "Dairy-Free",
            DietaryPreference::LowSugar => "Low-Sugar",
            DietaryPreference::NoPreference => "No Preference",
        }
    }
}

impl fmt::Display for DietaryPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietaryPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DietaryPreference::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let choices = DietaryPreference::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Unknown dietary preference: {}. Use one of: {}", s, choices)
            })
    }
}

/// 呼び出し側が指定する食事制限の集合（永続化しない）
pub type DietaryPreferenceSet = BTreeSet<DietaryPreference>;

/// 量・食材変更のカスタマイズ指定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    #[serde(default)]
    pub portion_size: Option<String>,
    #[serde(default)]
    pub ingredient_swap: Option<String>,
}

/// おすすめ結果（メニュー項目のコピー + 一時的な注記）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub item: MenuItem,
    #[serde(default)]
    pub portion_size: Option<String>,
    #[serde(default)]
    pub ingredient_swap: Option<String>,
}
