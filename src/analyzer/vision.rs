//! 画像ラベル検出（Google Cloud Vision）

use crate::error::{DishMatchError, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Serialize;
use std::future::Future;

const VISION_API_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// 画像 → ラベル列（順序付き、空もありうる）
pub trait LabelDetector: Send + Sync {
    fn detect(&self, image: Vec<u8>) -> impl Future<Output = Result<Vec<String>>> + Send;
}

#[derive(Clone)]
pub struct GoogleVisionClient {
    api_key: String,
    max_results: usize,
    client: Client,
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults")]
    max_results: usize,
}

impl GoogleVisionClient {
    pub fn new(api_key: String, max_results: usize) -> Self {
        Self {
            api_key,
            max_results,
            client: Client::new(),
        }
    }

    fn build_request(&self, image: &[u8]) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: "LABEL_DETECTION",
                    max_results: self.max_results,
                }],
            }],
        }
    }
}

impl LabelDetector for GoogleVisionClient {
    async fn detect(&self, image: Vec<u8>) -> Result<Vec<String>> {
        let request = self.build_request(&image);

        let response = self
            .client
            .post(VISION_API_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Vision API request failed: {}", e);
                DishMatchError::transport("label_detection", e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DishMatchError::transport("label_detection", e.to_string()))?;

        if !status.is_success() {
            tracing::error!("Vision API error: {}", status);
            return Err(DishMatchError::transport(
                "label_detection",
                format!("Vision API returned {}: {}", status, body),
            ));
        }

        let labels = dish_match_common::parse_label_response(&body)?;
        tracing::debug!(count = labels.len(), "ラベル検出完了");
        Ok(labels)
    }
}
