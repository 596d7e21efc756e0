//! 結果の表示（テキスト）

use crate::analyzer::DishReport;
use dish_match_common::{MatchKind, MatchResult, Recommendation};
use std::fmt::Write as _;

fn kind_label(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::ExactMatch => "✔ 完全一致",
        MatchKind::SimilarMatch => "≈ 類似",
        MatchKind::NoMatch => "✗ 該当なし",
        MatchKind::Error => "⚠ エラー",
    }
}

pub fn format_match(result: &MatchResult<'_>) -> String {
    let mut out = String::new();
    match result.matched_item {
        Some(item) => {
            let _ = writeln!(out, "{}: {}", kind_label(result.kind), item.name);
            if let Some(desc) = item.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(out, "  {}", desc);
            }
        }
        None => {
            let _ = writeln!(out, "{}: {}", kind_label(result.kind), result.message);
        }
    }
    out
}

pub fn format_recommendations(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return "おすすめ: 条件に合うメニューがありません\n".to_string();
    }

    let mut out = format!("おすすめ ({}件):\n", recommendations.len());
    for rec in recommendations {
        let _ = write!(out, "  - {}", rec.item.name);
        if !rec.item.dietary_tags.is_empty() {
            let _ = write!(out, " [{}]", rec.item.dietary_tags.join(", "));
        }
        if let Some(portion) = &rec.portion_size {
            let _ = write!(out, " / 量: {}", portion);
        }
        if let Some(swap) = &rec.ingredient_swap {
            let _ = write!(out, " / 変更: {}", swap);
        }
        out.push('\n');
    }
    out
}

pub fn format_report(report: &DishReport) -> String {
    let mut out = format!("📷 {}\n", report.file_name);

    if !report.labels.is_empty() {
        let _ = writeln!(out, "ラベル: {}", report.labels.join(", "));
    }
    if let Some(name) = &report.dish_name {
        let _ = writeln!(out, "料理名: {}", name);
    }
    if let Some(kind) = report.match_kind {
        match &report.matched_item {
            Some(item) => {
                let _ = writeln!(out, "{}: {}", kind_label(kind), item.name);
            }
            None => {
                let _ = writeln!(out, "{}: {}", kind_label(kind), report.match_message);
            }
        }
    }
    // 照合に失敗していても、メニューが取れていればおすすめは出す
    if !report.recommendations.is_empty() || (report.match_kind.is_some() && !report.has_errors()) {
        out.push_str(&format_recommendations(&report.recommendations));
    }
    if let Some(recipe) = &report.recipe {
        let _ = writeln!(out, "レシピ:\n{}", recipe);
    }
    for message in &report.messages {
        let _ = writeln!(out, "⚠ {}", message);
    }
    out
}
