//! メニュー照合
//!
//! - MenuCache: 一定時間使い回すメニューのスナップショット
//! - match_dish: 生成AIに最も近い項目を選ばせ、ローカルで検証する

pub mod store;

pub use store::{FirestoreMenuStore, JsonMenuStore, MenuSource, MenuStore};

use crate::analyzer::llm::TextGenerator;
use crate::deadline::with_deadline;
use crate::error::Result;
use crate::normalizer::clean_model_reply;
use dish_match_common::{
    build_menu_match_prompt, reconcile, MatchResult, MenuItem, NO_MENU_ITEMS_MESSAGE,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct MenuSnapshot {
    fetched_at: Instant,
    items: Arc<Vec<MenuItem>>,
}

/// メニューの時間制限付きキャッシュ
///
/// 取得後のメニューは変更しないので、`Arc` のまま複数の照合に渡してよい。
/// ロックは再取得の判定にだけ使う。
pub struct MenuCache<S> {
    store: S,
    ttl: Duration,
    timeout: Duration,
    slot: Mutex<Option<MenuSnapshot>>,
}

impl<S> MenuCache<S>
where
    S: MenuStore + Clone + 'static,
{
    pub fn new(store: S, ttl: Duration, timeout: Duration) -> Self {
        Self {
            store,
            ttl,
            timeout,
            slot: Mutex::new(None),
        }
    }

    /// 有効期間内ならスナップショットを返し、切れていれば再取得
    pub async fn get(&self) -> Result<Arc<Vec<MenuItem>>> {
        let mut slot = self.slot.lock().await;

        if let Some(snapshot) = slot.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                tracing::debug!(count = snapshot.items.len(), "メニューキャッシュ使用");
                return Ok(Arc::clone(&snapshot.items));
            }
        }

        let store = self.store.clone();
        let items = with_deadline("menu_fetch", self.timeout, async move { store.list_items().await }).await?;
        let items = Arc::new(items);

        *slot = Some(MenuSnapshot {
            fetched_at: Instant::now(),
            items: Arc::clone(&items),
        });

        Ok(items)
    }

    /// 次回の `get` で必ず再取得させる
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

/// 料理名をメニューに照合する
///
/// メニューが空なら生成AIを呼ばずに終了する。
pub async fn match_dish<'a, G>(
    generator: &G,
    dish_name: &str,
    items: &'a [MenuItem],
    timeout: Duration,
) -> Result<MatchResult<'a>>
where
    G: TextGenerator + Clone + 'static,
{
    if items.is_empty() {
        return Ok(MatchResult::no_match(NO_MENU_ITEMS_MESSAGE, ""));
    }

    let prompt = build_menu_match_prompt(dish_name, items);
    let generator = generator.clone();
    let reply = with_deadline("menu_match", timeout, async move { generator.generate(prompt).await }).await?;

    let cleaned = clean_model_reply(&reply);
    let mut result = reconcile(&cleaned, items);
    result.raw_model_text = reply;

    tracing::debug!(kind = %result.kind, reply = %cleaned, "メニュー照合完了");
    Ok(result)
}
