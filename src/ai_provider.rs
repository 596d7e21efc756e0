use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    #[default]
    Gemini,
    #[value(name = "openai")]
    OpenAi,
}

impl AiProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini",
            AiProvider::OpenAi => "openai",
        }
    }

    /// APIキーを読む環境変数
    pub fn api_key_env(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "GEMINI_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}
