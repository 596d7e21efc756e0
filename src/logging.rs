//! ログ初期化
//!
//! 診断ログは stderr へ（`RUST_LOG` で上書き可）。利用者向けの進捗は stdout の println! で出す。

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

/// `verbose` なら debug、そうでなければ warn 以上
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "dish_match=debug,dish_match_common=debug" } else { "warn" };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
