//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use dish_match::config::Config;
use dish_match::error::DishMatchError;
use dish_match::matcher::{JsonMenuStore, MenuStore};
use dish_match::scanner;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));

    let err = result.unwrap_err();
    assert!(matches!(err, DishMatchError::FolderNotFound(_)));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path());

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// 存在しない画像
#[test]
fn test_load_missing_image() {
    let err = scanner::load_image(Path::new("/nonexistent/dish.jpg")).unwrap_err();
    assert!(matches!(err, DishMatchError::FileNotFound(_)));
}

/// JPEG/PNG以外は拒否（拡張子ではなく中身で判定）
#[test]
fn test_load_gif_disguised_as_jpeg() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("dish.jpg");
    std::fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();

    let err = scanner::load_image(&path).unwrap_err();
    assert!(matches!(err, DishMatchError::UnsupportedImage(_)));
    assert!(!err.is_fatal());
}

/// 壊れたメニューJSON
#[tokio::test]
async fn test_invalid_menu_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("menu.json");
    std::fs::write(&path, "[{\"name\": ").unwrap();

    let store = JsonMenuStore::new(&path);
    assert!(store.list_items().await.is_err());
}

/// 存在しないメニューファイル
#[tokio::test]
async fn test_missing_menu_file() {
    let store = JsonMenuStore::new(Path::new("/nonexistent/menu.json"));
    assert!(store.list_items().await.is_err());
}

/// 壊れた設定ファイルは設定エラー
#[test]
fn test_corrupt_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.is_fatal());
}

/// 設定エラーと資格情報不足は致命的、タイムアウトは非致命的
#[test]
fn test_error_classification() {
    assert!(DishMatchError::Config("x".into()).is_fatal());
    assert!(DishMatchError::MissingCredential("Vision APIキー", "GOOGLE_VISION_API_KEY").is_fatal());

    let timeout = DishMatchError::Timeout {
        stage: "label_detection",
        timeout: Duration::from_secs(10),
    };
    assert!(!timeout.is_fatal());
    assert!(timeout.is_timeout());
    assert!(timeout.to_string().contains("label_detection"));
    assert!(timeout.to_string().contains("10秒"));

    // 1秒未満でも 0秒 とは表示しない
    let short = DishMatchError::Timeout {
        stage: "menu_match",
        timeout: Duration::from_millis(500),
    };
    assert!(short.to_string().contains("0.5秒"), "{}", short);
}
