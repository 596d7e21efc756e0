//! Dish Match Common Library
//!
//! CLIと外部クライアントで共有される型と純粋ロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod prompts;
pub mod parser;
pub mod menu;
pub mod reconciler;
pub mod recommend;

pub use types::{
    Customization, DetectedLabels, DietaryPreference, DietaryPreferenceSet, MatchKind,
    MatchResult, MenuItem, Recommendation, DEFAULT_LABEL_LIMIT,
};
pub use error::{Error, Result};
pub use prompts::{
    build_dish_name_prompt, build_menu_match_prompt, build_recipe_prompt, NO_CLOSE_MATCH,
    UNKNOWN_DISH,
};
pub use parser::parse_label_response;
pub use menu::{parse_firestore_page, parse_menu_json, FirestorePage};
pub use reconciler::{reconcile, NO_MATCH_MESSAGE, NO_MENU_ITEMS_MESSAGE};
pub use recommend::filter_recommendations;
