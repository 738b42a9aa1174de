use config::ConfigError;
use serde::Deserialize;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a conversational AI image chatbot. Your task is to analyze images provided by the user and answer any questions related to those images. You can remember the context of the conversation and use it to provide accurate and relevant responses. Here are your instructions:

Image Analysis: When an image is provided, analyze it to understand its content, objects, and any relevant details.
Answering Questions: Respond to questions related to the image with accurate and detailed information.
Contextual Memory: Remember the context of the conversation, including previous images and questions, to provide coherent and contextually relevant answers.
User Interaction: Engage with the user in a friendly and helpful manner, ensuring that your responses are clear and informative.
";

/// Largest raw image accepted from the page. Gemini caps inline requests at 20 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub system_prompt: String,
    pub idle_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("llm.provider", "gemini")?
            .set_default("llm.gemini.api_base", "https://generativelanguage.googleapis.com/v1beta")?
            .set_default("llm.gemini.api_key", "${GOOGLE_API_KEY}")?
            .set_default("llm.gemini.model", "gemini-1.5-flash")?
            .set_default("llm.gemini.request_timeout_secs", 60)?
            .set_default("chat.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("chat.idle_timeout_secs", 120)?
            .set_default("chat.max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("JARVIS").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Values like ${GOOGLE_API_KEY} are resolved from the process environment
        app_config.server.host = expand_env(&app_config.server.host);
        app_config.llm.gemini.api_key = expand_env(&app_config.llm.gemini.api_key);

        app_config.validate()?;
        Ok(app_config)
    }

    /// Rejects configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.gemini.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "Gemini API key is missing; set GOOGLE_API_KEY or llm.gemini.api_key".to_string(),
            ));
        }
        if self.chat.idle_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "chat.idle_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.chat.max_upload_bytes == 0 {
            return Err(ConfigError::Message(
                "chat.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.chat.idle_timeout_secs as i64)
    }
}

pub fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else {
        val.to_string()
    }
}
