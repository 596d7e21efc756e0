//! メニューデータのデコード
//!
//! - Firestore REST の documents 一覧（型付き値）→ MenuItem
//! - ローカルJSON配列 → MenuItem

use crate::error::{Error, Result};
use crate::types::MenuItem;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Firestore の1ページ分
#[derive(Debug, Clone, Default)]
pub struct FirestorePage {
    pub items: Vec<MenuItem>,
    /// name フィールドがなく読み飛ばした件数
    pub skipped: usize,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// 型付き値から文字列を取り出す（stringValue 以外は文字列化できるものだけ）
fn as_text(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    if let Some(s) = obj.get("stringValue").and_then(Value::as_str) {
        return Some(s.to_string());
    }
    if let Some(s) = obj.get("integerValue").and_then(Value::as_str) {
        return Some(s.to_string());
    }
    obj.get("doubleValue").and_then(Value::as_f64).map(|d| d.to_string())
}

/// arrayValue を文字列配列に。単一の stringValue はカンマ区切りとして扱う
fn as_text_list(value: &Value) -> Vec<String> {
    if let Some(values) = value
        .get("arrayValue")
        .and_then(|a| a.get("values"))
        .and_then(Value::as_array)
    {
        return values.iter().filter_map(as_text).collect();
    }

    as_text(value)
        .map(|s| {
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| fields.get(*k))
}

fn document_to_item(doc: &Document) -> Option<MenuItem> {
    let name = field(&doc.fields, &["name"]).and_then(as_text)?;
    if name.trim().is_empty() {
        return None;
    }

    let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();

    Some(MenuItem {
        id,
        name,
        description: field(&doc.fields, &["description"])
            .and_then(as_text)
            .filter(|d| !d.is_empty()),
        ingredients: field(&doc.fields, &["ingredients"])
            .map(as_text_list)
            .unwrap_or_default(),
        dietary_tags: field(&doc.fields, &["dietary_tags", "dietaryTags", "tags"])
            .map(as_text_list)
            .unwrap_or_default(),
    })
}

/// Firestore documents.list のレスポンスをパース
pub fn parse_firestore_page(response: &str) -> Result<FirestorePage> {
    let parsed: ListDocumentsResponse = serde_json::from_str(response)
        .map_err(|e| Error::Parse(format!("Firestore JSONパースエラー: {}", e)))?;

    let mut page = FirestorePage {
        next_page_token: parsed.next_page_token.filter(|t| !t.is_empty()),
        ..Default::default()
    };

    for doc in &parsed.documents {
        match document_to_item(doc) {
            Some(item) => page.items.push(item),
            None => page.skipped += 1,
        }
    }

    Ok(page)
}

/// ローカルのメニューJSON（MenuItem配列）をパース
///
/// id が空の項目にはリスト内の位置を割り当てる。
pub fn parse_menu_json(json: &str) -> Result<Vec<MenuItem>> {
    let mut items: Vec<MenuItem> = serde_json::from_str(json)?;
    for (index, item) in items.iter_mut().enumerate() {
        if item.id.trim().is_empty() {
            item.id = index.to_string();
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_firestore_page() {
        let response = r#"{
  "documents": [
    {
      "name": "projects/demo/databases/(default)/documents/menu/abc123",
      "fields": {
        "name": {"stringValue": "Veggie Burger"},
        "description": {"stringValue": "Grilled plant-based patty"},
        "ingredients": {"arrayValue": {"values": [{"stringValue": "bun"}, {"stringValue": "patty"}]}},
        "dietary_tags": {"arrayValue": {"values": [{"stringValue": "vegan"}]}}
      }
    },
    {
      "name": "projects/demo/databases/(default)/documents/menu/def456",
      "fields": {
        "name": {"stringValue": "Beef Burger"},
        "tags": {"stringValue": "gluten-free, keto"}
      }
    },
    {
      "name": "projects/demo/databases/(default)/documents/menu/broken",
      "fields": {"description": {"stringValue": "no name"}}
    }
  ],
  "nextPageToken": "token-2"
}"#;
        let page = parse_firestore_page(response).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.skipped, 1);
        assert_eq!(page.next_page_token.as_deref(), Some("token-2"));

        let veggie = &page.items[0];
        assert_eq!(veggie.id, "abc123");
        assert_eq!(veggie.description.as_deref(), Some("Grilled plant-based patty"));
        assert_eq!(veggie.ingredients, vec!["bun", "patty"]);
        assert_eq!(veggie.dietary_tags, vec!["vegan"]);

        let beef = &page.items[1];
        assert!(beef.description.is_none());
        assert_eq!(beef.dietary_tags, vec!["gluten-free", "keto"]);
    }

    #[test]
    fn test_parse_firestore_empty_collection() {
        let page = parse_firestore_page("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_parse_menu_json_assigns_ids() {
        let json = r#"[
  {"name": "Veggie Burger", "dietaryTags": ["vegan"]},
  {"id": "beef", "name": "Beef Burger", "description": "Angus beef"}
]"#;
        let items = parse_menu_json(json).unwrap();
        assert_eq!(items[0].id, "0");
        assert_eq!(items[1].id, "beef");
        assert_eq!(items[0].dietary_tags, vec!["vegan"]);
    }

    #[test]
    fn test_parse_menu_json_invalid() {
        assert!(matches!(parse_menu_json("{ nope }"), Err(Error::Json(_))));
    }
}
