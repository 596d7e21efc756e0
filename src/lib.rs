pub mod ai_provider;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod deadline;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod normalizer;
pub mod render;
pub mod scanner;
