//! メニュー照合（リコンサイル）
//!
//! 生成AIの自由記述の応答を、渡されたメニュー列の1項目へ対応付ける。
//!
//! 判定順:
//! 1. 空の応答 / 番兵 "No close match found" → 一致なし
//! 2. 名前の完全一致（大文字小文字無視）→ ExactMatch
//! 3. 応答が名前または説明の部分文字列 → SimilarMatch
//! 4. どれにも当たらない → 応答そのものをメッセージにして一致なし
//!
//! 2と3はそれぞれリスト順で最初に当たった項目を返す。

use crate::prompts::NO_CLOSE_MATCH;
use crate::types::{MatchKind, MatchResult, MenuItem};

/// メニューが空のときのメッセージ
pub const NO_MENU_ITEMS_MESSAGE: &str = "No menu items available to match against.";

/// 一致なしの正規メッセージ
pub const NO_MATCH_MESSAGE: &str = "No matching dish found on the menu.";

/// 応答がモデルの番兵かどうか
fn is_no_match_sentinel(reply: &str) -> bool {
    let reply = reply.trim().trim_end_matches('.').trim_end();
    reply.eq_ignore_ascii_case(NO_CLOSE_MATCH)
}

/// 応答文字列をメニュー項目へ対応付ける
pub fn reconcile<'a>(reply: &str, items: &'a [MenuItem]) -> MatchResult<'a> {
    if items.is_empty() {
        return MatchResult::no_match(NO_MENU_ITEMS_MESSAGE, reply);
    }

    let trimmed = reply.trim();
    if trimmed.is_empty() || is_no_match_sentinel(trimmed) {
        return MatchResult::no_match(NO_MATCH_MESSAGE, reply);
    }

    let needle = trimmed.to_lowercase();

    if let Some(item) = items.iter().find(|item| item.name.trim().to_lowercase() == needle) {
        return MatchResult::matched(item, MatchKind::ExactMatch, reply);
    }

    if let Some(item) = items.iter().find(|item| {
        item.name.to_lowercase().contains(&needle)
            || item.description_or_empty().to_lowercase().contains(&needle)
    }) {
        return MatchResult::matched(item, MatchKind::SimilarMatch, reply);
    }

    MatchResult::no_match(trimmed, reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, description: Option<&str>, tags: &[&str]) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            ingredients: Vec::new(),
            dietary_tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn burgers() -> Vec<MenuItem> {
        vec![
            item("0", "Veggie Burger", None, &["vegan"]),
            item("1", "Beef Burger", None, &[]),
        ]
    }

    #[test]
    fn test_exact_match() {
        let menu = burgers();
        let result = reconcile("Veggie Burger", &menu);
        assert_eq!(result.kind, MatchKind::ExactMatch);
        assert_eq!(result.matched_item.unwrap().id, "0");
    }

    #[test]
    fn test_exact_match_ignores_case_and_whitespace() {
        let menu = burgers();
        let result = reconcile("  beef BURGER\n", &menu);
        assert_eq!(result.kind, MatchKind::ExactMatch);
        assert_eq!(result.matched_item.unwrap().id, "1");
    }

    #[test]
    fn test_similar_match_first_in_list_order() {
        let menu = burgers();
        let result = reconcile("burger", &menu);
        assert_eq!(result.kind, MatchKind::SimilarMatch);
        assert_eq!(result.matched_item.unwrap().id, "0");
    }

    #[test]
    fn test_similar_match_on_description() {
        let menu = vec![
            item("a", "House Special", Some("Slow braised short rib with kimchi"), &[]),
            item("b", "Garden Salad", Some("Greens"), &[]),
        ];
        let result = reconcile("Short Rib", &menu);
        assert_eq!(result.kind, MatchKind::SimilarMatch);
        assert_eq!(result.matched_item.unwrap().id, "a");
    }

    #[test]
    fn test_exact_match_takes_precedence_over_earlier_substring() {
        let menu = vec![
            item("a", "Chef's Plate", Some("Comes with a side of fries"), &[]),
            item("b", "Fries", None, &[]),
        ];
        let result = reconcile("fries", &menu);
        assert_eq!(result.kind, MatchKind::ExactMatch);
        assert_eq!(result.matched_item.unwrap().id, "b");
    }

    #[test]
    fn test_sentinel_beats_substring() {
        let menu = vec![
            item("a", "Mystery Box", Some("No close match found anywhere else"), &[]),
            item("b", "Burger", None, &[]),
        ];
        let result = reconcile("No close match found", &menu);
        assert!(result.matched_item.is_none());
        assert_eq!(result.kind, MatchKind::NoMatch);
        assert_eq!(result.message, NO_MATCH_MESSAGE);
        assert_eq!(result.raw_model_text, "No close match found");
    }

    #[test]
    fn test_sentinel_with_trailing_period() {
        let menu = burgers();
        let result = reconcile("No close match found.", &menu);
        assert!(result.matched_item.is_none());
        assert_eq!(result.message, NO_MATCH_MESSAGE);
    }

    #[test]
    fn test_unmatched_reply_returned_as_message() {
        let menu = burgers();
        let result = reconcile("Pad Thai", &menu);
        assert!(result.matched_item.is_none());
        assert_eq!(result.kind, MatchKind::NoMatch);
        assert_eq!(result.message, "Pad Thai");
    }

    #[test]
    fn test_empty_menu() {
        let result = reconcile("Veggie Burger", &[]);
        assert!(result.matched_item.is_none());
        assert_eq!(result.message, NO_MENU_ITEMS_MESSAGE);
    }

    #[test]
    fn test_blank_reply_is_not_a_match() {
        let menu = burgers();
        let result = reconcile("   ", &menu);
        assert!(result.matched_item.is_none());
        assert_eq!(result.message, NO_MATCH_MESSAGE);
    }

    #[test]
    fn test_matched_item_is_element_of_input() {
        let menu = burgers();
        let result = reconcile("burger", &menu);
        let matched = result.matched_item.unwrap();
        assert!(menu.iter().any(|m| std::ptr::eq(m, matched)));
    }
}
