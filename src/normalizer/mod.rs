//! 文字列の正規化モジュール
//!
//! 外部APIとのやり取りで出る表記揺れを整える。
//!
//! ## 対象
//! 1. ラベル: 空白・改行の統一
//! 2. 生成AIの応答: 囲みの引用符、Markdown強調、"Dish:" 等の接頭辞、末尾の句点を除去

use regex::Regex;

/// ラベルの空白を1文字に統一
pub fn normalize_label(label: &str) -> String {
    lazy_static::lazy_static! {
        static ref WS_RE: Regex = Regex::new(r"\s+").unwrap();
    }
    WS_RE.replace_all(label.trim(), " ").to_string()
}

/// 生成AIの1行応答を整える
///
/// 判定に使う文字列そのものは変えず、装飾だけを外す。
/// 複数行の場合は最初の空でない行を使う。
pub fn clean_model_reply(reply: &str) -> String {
    lazy_static::lazy_static! {
        // "Dish: ..." / "Answer - ..." / "Closest match: ..."
        static ref PREFIX_RE: Regex =
            Regex::new(r"(?i)^(dish(\s+name)?|answer|closest\s+match|match)\s*[:\-]\s*").unwrap();
        // **bold** / __bold__ / `code`
        static ref EMPHASIS_RE: Regex = Regex::new(r"^(\*\*|__|`)(.+?)(\*\*|__|`)$").unwrap();
    }

    let line = reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");

    let mut text = PREFIX_RE.replace(line, "").to_string();
    text = EMPHASIS_RE.replace(&text, "$2").to_string();

    // 末尾の句点は引用符の外側・内側どちらにも付きうる
    let text = strip_period(text.trim());
    let text = text
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '「' | '」'))
        .trim();
    strip_period(text).to_string()
}

fn strip_period(text: &str) -> &str {
    text.strip_suffix('.').unwrap_or(text).trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Fast \n food "), "Fast food");
        assert_eq!(normalize_label("Ramen"), "Ramen");
    }

    #[test]
    fn test_clean_plain_reply() {
        assert_eq!(clean_model_reply("Veggie Burger"), "Veggie Burger");
        assert_eq!(clean_model_reply("  Veggie Burger\n"), "Veggie Burger");
    }

    #[test]
    fn test_clean_quoted_reply() {
        assert_eq!(clean_model_reply("\"Veggie Burger\""), "Veggie Burger");
        assert_eq!(clean_model_reply("“Pad Thai”."), "Pad Thai");
    }

    #[test]
    fn test_clean_prefixed_reply() {
        assert_eq!(clean_model_reply("Dish: Margherita Pizza"), "Margherita Pizza");
        assert_eq!(clean_model_reply("Closest match - Beef Burger"), "Beef Burger");
    }

    #[test]
    fn test_clean_markdown_reply() {
        assert_eq!(clean_model_reply("**Beef Burger**"), "Beef Burger");
    }

    #[test]
    fn test_clean_keeps_sentinel_text() {
        assert_eq!(clean_model_reply("No close match found."), "No close match found");
    }

    #[test]
    fn test_clean_multiline_uses_first_line() {
        assert_eq!(clean_model_reply("\nTonkotsu Ramen\nIt is a pork broth noodle soup."), "Tonkotsu Ramen");
    }

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean_model_reply("   "), "");
    }
}
