use clap::{Args, Parser, Subcommand};
use crate::ai_provider::AiProvider;
use dish_match_common::{Customization, DietaryPreference, DietaryPreferenceSet};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dish-match")]
#[command(about = "料理写真AI判定・メニュー照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 生成AIプロバイダ (gemini/openai)
    #[arg(long, default_value = "gemini", global = true)]
    pub ai_provider: AiProvider,
}

/// メニューの取得元
#[derive(Args, Clone, Debug, Default)]
pub struct MenuArgs {
    /// ローカルのメニューJSON（省略時は Firestore の menu コレクション）
    #[arg(short, long)]
    pub menu: Option<PathBuf>,
}

/// 食事制限とカスタマイズ
#[derive(Args, Clone, Debug, Default)]
pub struct PreferenceArgs {
    /// 食事制限 (Vegan/Vegetarian/Gluten-Free/Keto/Dairy-Free/Low-Sugar/"No Preference")、複数指定可
    #[arg(short, long = "diet")]
    pub diet: Vec<DietaryPreference>,

    /// 量の指定（例: Small, Regular, Large）
    #[arg(long)]
    pub portion: Option<String>,

    /// 食材の変更（例: "no onions"）
    #[arg(long)]
    pub swap: Option<String>,
}

impl PreferenceArgs {
    pub fn preferences(&self) -> DietaryPreferenceSet {
        self.diet.iter().copied().collect()
    }

    pub fn customization(&self) -> Customization {
        Customization {
            portion_size: self.portion.clone().filter(|s| !s.trim().is_empty()),
            ingredient_swap: self.swap.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

/// 出力先
#[derive(Args, Clone, Debug, Default)]
pub struct OutputArgs {
    /// JSONで出力
    #[arg(long)]
    pub json: bool,

    /// 結果JSONの保存先
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 料理写真1枚を判定してメニューと照合
    Identify {
        /// 写真ファイル（JPEG/PNG）
        #[arg(required = true)]
        image: PathBuf,

        #[command(flatten)]
        menu: MenuArgs,

        #[command(flatten)]
        prefs: PreferenceArgs,

        #[command(flatten)]
        out: OutputArgs,

        /// ラベルキャッシュを使用（再検出をスキップ）
        #[arg(long)]
        use_cache: bool,

        /// レシピも提案する
        #[arg(long)]
        recipe: bool,
    },

    /// フォルダ内の写真をまとめて判定
    Batch {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        #[command(flatten)]
        menu: MenuArgs,

        #[command(flatten)]
        prefs: PreferenceArgs,

        #[command(flatten)]
        out: OutputArgs,

        /// ラベルキャッシュを使用（再検出をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 料理名をメニューと照合（画像なし）
    Match {
        /// 料理名
        #[arg(required = true)]
        dish_name: String,

        #[command(flatten)]
        menu: MenuArgs,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 食事制限でメニューを絞り込み
    Recommend {
        #[command(flatten)]
        menu: MenuArgs,

        #[command(flatten)]
        prefs: PreferenceArgs,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 設定を表示/編集
    Config {
        /// Vision APIキーを設定
        #[arg(long)]
        set_vision_key: Option<String>,

        /// 生成AI（--ai-provider で指定したもの）のAPIキーを設定
        #[arg(long)]
        set_llm_key: Option<String>,

        /// FirebaseプロジェクトIDを設定
        #[arg(long)]
        set_firebase_project: Option<String>,

        /// Firebase APIキーを設定
        #[arg(long)]
        set_firebase_key: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// ラベルキャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identify_with_preferences() {
        let cli = Cli::try_parse_from([
            "dish-match", "identify", "dish.jpg", "--diet", "vegan", "--diet", "gluten-free",
            "--portion", "Large", "--menu", "menu.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Identify { image, menu, prefs, .. } => {
                assert_eq!(image, PathBuf::from("dish.jpg"));
                assert_eq!(menu.menu, Some(PathBuf::from("menu.json")));
                let set = prefs.preferences();
                assert!(set.contains(&DietaryPreference::Vegan));
                assert!(set.contains(&DietaryPreference::GlutenFree));
                assert_eq!(prefs.customization().portion_size.as_deref(), Some("Large"));
            }
            _ => panic!("identify を期待"),
        }
        assert_eq!(cli.ai_provider, AiProvider::Gemini);
    }

    #[test]
    fn test_rejects_unknown_diet() {
        let result = Cli::try_parse_from(["dish-match", "recommend", "--diet", "paleo"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_openai_provider_flag() {
        let cli = Cli::try_parse_from(["dish-match", "--ai-provider", "openai", "match", "ramen"]).unwrap();
        assert_eq!(cli.ai_provider, AiProvider::OpenAi);
    }

    #[test]
    fn test_blank_customization_is_none() {
        let prefs = PreferenceArgs {
            diet: vec![],
            portion: Some("  ".into()),
            swap: None,
        };
        assert_eq!(prefs.customization(), Customization::default());
    }
}
