//! 外部呼び出しのタイムアウト
//!
//! 呼び出しをワーカータスクとして起動し、期限付きで完了を待つ。
//! 期限を過ぎたタスクは中断せず切り離す（結果は捨てる）。

use crate::error::{DishMatchError, Result};
use std::future::Future;
use std::time::Duration;

/// `future` を別タスクで実行し、`timeout` 以内の完了を待つ
pub async fn with_deadline<T, F>(stage: &'static str, timeout: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let started = std::time::Instant::now();
    let handle = tokio::spawn(future);

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => {
            tracing::debug!(stage, elapsed_ms = started.elapsed().as_millis() as u64, "外部呼び出し完了");
            result
        }
        Ok(Err(join_err)) => {
            tracing::error!(stage, "ワーカータスク異常終了: {}", join_err);
            Err(DishMatchError::transport(stage, format!("ワーカー異常終了: {}", join_err)))
        }
        Err(_) => {
            // JoinHandle を drop するとタスクは切り離されるだけで止まらない
            tracing::warn!(stage, timeout_ms = timeout.as_millis() as u64, "外部呼び出しがタイムアウト");
            Err(DishMatchError::Timeout { stage, timeout })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let value = with_deadline("test", Duration::from_secs(1), async { Ok(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_inner_error_is_propagated() {
        let result: Result<()> = with_deadline("test", Duration::from_secs(1), async {
            Err(DishMatchError::transport("test", "boom"))
        })
        .await;
        assert!(matches!(result, Err(DishMatchError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_timeout_is_distinguishable() {
        let result: Result<()> = with_deadline("slow", Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert!(!err.is_fatal());
        assert!(matches!(err, DishMatchError::Timeout { timeout, .. } if timeout == Duration::from_millis(20)));
        assert!(err.to_string().contains("0.02秒"), "{}", err);
    }

    #[tokio::test]
    async fn test_worker_is_detached_not_killed() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result: Result<()> = with_deadline("detached", Duration::from_millis(10), async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(result.unwrap_err().is_timeout());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_worker_becomes_transport_error() {
        let fail = true;
        let result: Result<()> = with_deadline("panic", Duration::from_secs(1), async move {
            if fail {
                panic!("worker failure");
            }
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(DishMatchError::Transport { stage: "panic", .. })));
    }
}
