use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DishMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{0} が設定されていません。環境変数 {1} か `dish-match config` で設定してください")]
    MissingCredential(&'static str, &'static str),

    #[error("API呼び出しエラー ({stage}): {message}")]
    Transport { stage: &'static str, message: String },

    #[error("タイムアウト ({stage}): {}秒以内に応答がありません", .timeout.as_secs_f64())]
    Timeout { stage: &'static str, timeout: Duration },

    #[error("対応していない画像形式です（JPEG/PNGのみ）: {0}")]
    UnsupportedImage(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] dish_match_common::Error),
}

impl DishMatchError {
    pub fn transport(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Transport { stage, message: message.into() }
    }

    /// 設定不備はセッション全体を止める。それ以外は該当ステージのみ
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingCredential(..))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, DishMatchError>;
