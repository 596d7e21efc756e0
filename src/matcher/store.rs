//! メニューストア（読み取り専用）
//!
//! - FirestoreMenuStore: Firestore REST のコレクション一覧
//! - JsonMenuStore: ローカルのJSONファイル

use crate::config::{Config, FirebaseCredentials};
use crate::error::{DishMatchError, Result};
use dish_match_common::{parse_firestore_page, parse_menu_json, MenuItem};
use reqwest::Client;
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};

const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

pub trait MenuStore: Send + Sync {
    fn list_items(&self) -> impl Future<Output = Result<Vec<MenuItem>>> + Send;
}

#[derive(Clone, Debug)]
pub struct JsonMenuStore {
    path: PathBuf,
}

impl JsonMenuStore {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }
}

impl MenuStore for JsonMenuStore {
    async fn list_items(&self) -> Result<Vec<MenuItem>> {
        if !self.path.exists() {
            return Err(DishMatchError::FileNotFound(self.path.display().to_string()));
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let items = parse_menu_json(&content)?;
        tracing::debug!(path = %self.path.display(), count = items.len(), "メニュー読み込み");
        Ok(items)
    }
}

#[derive(Clone, Debug)]
pub struct FirestoreMenuStore {
    credentials: FirebaseCredentials,
    collection: String,
    client: Client,
}

impl FirestoreMenuStore {
    pub fn new(credentials: FirebaseCredentials, collection: String) -> Self {
        Self {
            credentials,
            collection,
            client: Client::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            FIRESTORE_API_BASE, self.credentials.project_id, self.collection
        )
    }
}

impl MenuStore for FirestoreMenuStore {
    async fn list_items(&self) -> Result<Vec<MenuItem>> {
        let url = self.collection_url();
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut request = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.credentials.api_key)
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await.map_err(|e| {
                tracing::error!("Firestore request failed: {}", e);
                DishMatchError::transport("menu_fetch", e.to_string())
            })?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| DishMatchError::transport("menu_fetch", e.to_string()))?;

            if !status.is_success() {
                tracing::error!("Firestore error: {}", status);
                return Err(DishMatchError::transport(
                    "menu_fetch",
                    format!("Firestore returned {}: {}", status, body),
                ));
            }

            let page = parse_firestore_page(&body)?;
            if page.skipped > 0 {
                tracing::warn!(skipped = page.skipped, "name のないメニュー文書を読み飛ばしました");
            }
            items.extend(page.items);

            page_token = next_page(&mut seen_tokens, page.next_page_token);
            if page_token.is_none() {
                break;
            }
        }

        tracing::debug!(collection = %self.collection, count = items.len(), "メニュー取得");
        Ok(items)
    }
}

/// 次に読むページトークン。一度読んだトークンが戻ってきたら終了
fn next_page(seen: &mut HashSet<String>, token: Option<String>) -> Option<String> {
    let token = token.filter(|t| !t.is_empty())?;
    if !seen.insert(token.clone()) {
        tracing::warn!("Firestore が同じ nextPageToken を返しました。ページングを打ち切ります");
        return None;
    }
    Some(token)
}

/// メニューの取得元
#[derive(Clone, Debug)]
pub enum MenuSource {
    Json(JsonMenuStore),
    Firestore(FirestoreMenuStore),
}

impl MenuSource {
    /// ローカルファイル指定があればそれを使い、なければ Firestore
    pub fn from_config(config: &Config, menu_file: Option<&Path>) -> Result<Self> {
        match menu_file {
            Some(path) => Ok(MenuSource::Json(JsonMenuStore::new(path))),
            None => Ok(MenuSource::Firestore(FirestoreMenuStore::new(
                config.firebase()?,
                config.menu_collection.clone(),
            ))),
        }
    }
}

impl MenuStore for MenuSource {
    async fn list_items(&self) -> Result<Vec<MenuItem>> {
        match self {
            MenuSource::Json(store) => store.list_items().await,
            MenuSource::Firestore(store) => store.list_items().await,
        }
    }
}
