//! プロンプト生成モジュール
//!
//! 生成AIへ渡すプロンプトと、応答側の番兵文字列:
//! - build_dish_name_prompt: ラベルから料理名を推定
//! - build_menu_match_prompt: 料理名に最も近いメニュー項目を選択
//! - build_recipe_prompt: 料理名からレシピを提案

use crate::types::MenuItem;

/// ラベルが1件もない場合に返す料理名
pub const UNKNOWN_DISH: &str = "Unknown dish";

/// メニューに近いものがない場合にモデルが返す文字列
pub const NO_CLOSE_MATCH: &str = "No close match found";

/// 料理名推定プロンプト
///
/// ラベルはそのままカンマ区切りで埋め込む。
pub fn build_dish_name_prompt(labels: &[String]) -> String {
    format!(
        "Based on the following labels detected in a photo of a restaurant dish, \
         identify the dish: {}. Respond with only the name of the dish.",
        labels.join(", ")
    )
}

/// メニュー照合プロンプト
///
/// 各メニュー項目を "name: description" の1行で列挙する。
pub fn build_menu_match_prompt(dish_name: &str, items: &[MenuItem]) -> String {
    let menu_list = items
        .iter()
        .map(|item| format!("{}: {}", item.name, item.description_or_empty()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"A guest photographed a dish identified as "{dish_name}".

Menu:
{menu_list}

Reply with the exact name of the single menu item that is the closest match.
If nothing on the menu is close, reply with exactly: {NO_CLOSE_MATCH}
Do not add any other text."#
    )
}

/// レシピ提案プロンプト
pub fn build_recipe_prompt(dish_name: &str) -> String {
    format!(
        "Suggest a short home-cooking recipe for {dish_name}. \
         List the ingredients first, then at most six numbered steps."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, description: Option<&str>) -> MenuItem {
        MenuItem {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: description.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_dish_name_prompt_embeds_labels_verbatim() {
        let labels = vec!["Food".to_string(), "Ramen".to_string(), "Noodle soup".to_string()];
        let prompt = build_dish_name_prompt(&labels);
        assert!(prompt.contains("Food, Ramen, Noodle soup"));
    }

    #[test]
    fn test_menu_match_prompt_lists_items() {
        let items = vec![
            item("Veggie Burger", Some("Plant-based patty")),
            item("Beef Burger", None),
        ];
        let prompt = build_menu_match_prompt("burger", &items);
        assert!(prompt.contains("\"burger\""));
        assert!(prompt.contains("Veggie Burger: Plant-based patty"));
        assert!(prompt.contains("Beef Burger: \n"));
        assert!(prompt.contains(NO_CLOSE_MATCH));
    }

    #[test]
    fn test_recipe_prompt() {
        let prompt = build_recipe_prompt("Pad Thai");
        assert!(prompt.contains("Pad Thai"));
    }
}
