//! APIレスポンスパーサー
//!
//! ラベル検出APIのJSONからラベル文字列を取り出す。

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    error: Option<StatusError>,
}

/// スコア等のメタデータは使わない
#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct StatusError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// ラベル検出レスポンスをパース
///
/// # Returns
/// * `Ok(Vec<String>)` - ラベル（APIの順序のまま、空の場合あり）
/// * `Err` - JSON不正、またはAPIが画像単位のエラーを返した場合
pub fn parse_label_response(response: &str) -> Result<Vec<String>> {
    let parsed: AnnotateResponse = serde_json::from_str(response)
        .map_err(|e| Error::Parse(format!("ラベル検出 JSONパースエラー: {}", e)))?;

    let Some(first) = parsed.responses.into_iter().next() else {
        return Ok(Vec::new());
    };

    if let Some(err) = first.error {
        return Err(Error::Parse(format!(
            "ラベル検出エラー (code {}): {}",
            err.code, err.message
        )));
    }

    Ok(first
        .label_annotations
        .into_iter()
        .map(|a| a.description)
        .filter(|d| !d.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_response_invalid_json() {
        let err = parse_label_response("<html>quota exceeded</html>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_parse_label_response() {
        let response = r#"{
  "responses": [
    {
      "labelAnnotations": [
        {"mid": "/m/02wbm", "description": "Food", "score": 0.98},
        {"mid": "/m/0cdn1", "description": "Hamburger", "score": 0.95},
        {"mid": "/m/01_bhs", "description": "Fast food", "score": 0.90}
      ]
    }
  ]
}"#;
        let labels = parse_label_response(response).unwrap();
        assert_eq!(labels, vec!["Food", "Hamburger", "Fast food"]);
    }

    #[test]
    fn test_parse_label_response_no_labels() {
        let labels = parse_label_response(r#"{"responses": [{}]}"#).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_parse_label_response_image_error() {
        let response = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        let err = parse_label_response(response).unwrap_err();
        assert!(err.to_string().contains("Bad image data."));
    }
}
