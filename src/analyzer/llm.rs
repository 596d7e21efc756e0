//! 生成AI（テキスト）連携
//!
//! プロンプト1本 → 応答テキスト1本。呼び出し間でセッション状態は持たない。
//! プロバイダは Gemini / OpenAI を切り替え可能。

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{DishMatchError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: String) -> impl Future<Output = Result<String>> + Send;
}

// =============================================
// Gemini
// =============================================

#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model_name: String,
    client: Client,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model_name: String) -> Self {
        Self {
            api_key,
            model_name,
            client: Client::new(),
        }
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: String) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model_name);
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature: 0.2 },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini API request failed: {}", e);
                DishMatchError::transport("text_generation", e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {}", status);
            return Err(DishMatchError::transport(
                "text_generation",
                format!("Gemini API returned {}: {}", status, error_text),
            ));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            DishMatchError::ApiParse(format!("Gemini応答: {}", e))
        })?;

        gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| DishMatchError::ApiParse("Gemini応答が空です".into()))
    }
}

// =============================================
// OpenAI
// =============================================

#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    model_name: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiClient {
    pub fn new(api_key: String, model_name: String) -> Self {
        Self {
            api_key,
            model_name,
            client: Client::new(),
        }
    }
}

impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: &self.model_name,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: Some(prompt),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI API request failed: {}", e);
                DishMatchError::transport("text_generation", e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API error: {}", status);
            return Err(DishMatchError::transport(
                "text_generation",
                format!("OpenAI API returned {}: {}", status, error_text),
            ));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            DishMatchError::ApiParse(format!("OpenAI応答: {}", e))
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DishMatchError::ApiParse("OpenAI応答が空です".into()))
    }
}

// =============================================
// プロバイダ切り替え
// =============================================

#[derive(Clone)]
pub enum LlmClient {
    Gemini(GeminiClient),
    OpenAi(OpenAiClient),
}

impl LlmClient {
    /// 設定から生成。APIキーがなければ設定エラー
    pub fn from_config(config: &Config, provider: AiProvider) -> Result<Self> {
        let api_key = config.llm_api_key(provider)?;
        let model = config.llm_model(provider).to_string();
        Ok(match provider {
            AiProvider::Gemini => LlmClient::Gemini(GeminiClient::new(api_key, model)),
            AiProvider::OpenAi => LlmClient::OpenAi(OpenAiClient::new(api_key, model)),
        })
    }
}

impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: String) -> Result<String> {
        match self {
            LlmClient::Gemini(client) => client.generate(prompt).await,
            LlmClient::OpenAi(client) => client.generate(prompt).await,
        }
    }
}
