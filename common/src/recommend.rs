//! 食事制限によるおすすめフィルタ
//!
//! 照合フローとは独立。入力のメニュー列は変更せず、コピーに注記を付けて返す。

use crate::types::{Customization, DietaryPreference, DietaryPreferenceSet, MenuItem, Recommendation};

/// 指定なし、または "No Preference" を含む場合は全件対象
fn accepts_everything(preferences: &DietaryPreferenceSet) -> bool {
    preferences.is_empty() || preferences.contains(&DietaryPreference::NoPreference)
}

/// メニューを食事制限で絞り込み、量・食材変更の注記を付ける
pub fn filter_recommendations(
    items: &[MenuItem],
    preferences: &DietaryPreferenceSet,
    customization: &Customization,
) -> Vec<Recommendation> {
    let everything = accepts_everything(preferences);

    items
        .iter()
        .filter(|item| everything || preferences.iter().any(|p| item.has_tag(p.as_str())))
        .map(|item| Recommendation {
            item: item.clone(),
            portion_size: customization.portion_size.clone(),
            ingredient_swap: customization.ingredient_swap.clone(),
        })
        .collect()
}
