use crate::LLMError;
use crate::languages::{
    DEFAULT_TARGET_LANGUAGE, Language, default_languages, find_by_name, from_names,
};
use crate::llm::dummy::DummyLLM;
use crate::llm::gemini::GeminiBuilder;
use crate::llm::openai::OpenAiBuilder;
use crate::llm::{Backend, LLMBuilder};
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::fmt::{Debug, Display};

pub const CONFIG_FILE: &str = "glossary-ai";
pub const ENV_PREFIX: &str = "GLOSSARY";
pub const API_KEY_VAR: &str = "API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAi,
    Dummy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub provider: Provider,
    pub model: String,
    pub api_base: Option<String>,
    pub languages: Option<Vec<String>>,
    pub default_language: String,
}

impl AppConfig {
    /// Defaults, then `glossary-ai.toml` if present, then `GLOSSARY_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("languages"),
            );
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
        cfg.default_language = cfg.default_language.trim().to_owned();
        let languages = cfg.languages();
        if languages.is_empty() {
            return Err(ConfigError::NoLanguages);
        }
        if find_by_name(&languages, &cfg.default_language).is_none() {
            return Err(ConfigError::UnknownDefaultLanguage(cfg.default_language));
        }
        Ok(cfg)
    }

    pub fn languages(&self) -> Vec<Language> {
        match self.languages.as_deref() {
            Some(names) => from_names(names),
            None => default_languages(),
        }
    }

    pub fn needs_api_key(&self) -> bool {
        self.provider != Provider::Dummy
    }

    pub fn build_backend(&self, api_key: Option<&ApiKey>) -> Result<Backend, ConfigError> {
        if !self.needs_api_key() {
            log::warn!("Using the offline dummy backend, answers are canned");
            return Ok(Backend::Dummy(DummyLLM::default()));
        }
        let api_key = api_key.ok_or(ConfigError::MissingApiKey)?.expose().to_owned();

        let backend = match self.provider {
            Provider::Gemini => {
                let mut builder = GeminiBuilder::new(self.model.clone(), api_key);
                if let Some(api_base) = self.api_base.clone() {
                    builder = builder.with_api_base(api_base);
                }
                Backend::Gemini(builder.build()?)
            }
            Provider::OpenAi => {
                let mut builder = OpenAiBuilder::new(self.model.clone(), api_key);
                if let Some(api_base) = self.api_base.clone() {
                    builder = builder.with_api_base(api_base);
                }
                Backend::OpenAi(builder.build()?)
            }
            Provider::Dummy => Backend::Dummy(DummyLLM::default()),
        };
        log::info!("Using {:?} backend with model {}", self.provider, self.model);
        Ok(backend)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("provider", "gemini")?
        .set_default("model", DEFAULT_MODEL)?
        .set_default("default_language", DEFAULT_TARGET_LANGUAGE)?)
}

/// The service credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Reads [`API_KEY_VAR`] once; an empty value counts as missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_value(std::env::var(API_KEY_VAR).ok())
    }

    pub fn from_value(value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(key) if !key.is_empty() => Ok(ApiKey(key)),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingApiKey,
    NoLanguages,
    UnknownDefaultLanguage(String),
    SourceError(::config::ConfigError),
    BackendError(LLMError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingApiKey => {
                write!(f, "{} environment variable not set", API_KEY_VAR)
            }
            ConfigError::NoLanguages => {
                write!(f, "No target languages configured")
            }
            ConfigError::UnknownDefaultLanguage(name) => {
                write!(f, "Default language {:?} is not in the language list", name)
            }
            ConfigError::SourceError(e) => {
                write!(f, "Invalid configuration: {}", e)
            }
            ConfigError::BackendError(e) => {
                write!(f, "Cannot set up backend: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<::config::ConfigError> for ConfigError {
    fn from(err: ::config::ConfigError) -> Self {
        ConfigError::SourceError(err)
    }
}

impl From<LLMError> for ConfigError {
    fn from(err: LLMError) -> Self {
        ConfigError::BackendError(err)
    }
}
