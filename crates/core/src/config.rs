//! Configuration management for inkpipe.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.inkpipe/config.yaml` in the workspace)
//! - Environment variables
//! - Command-line flags
//!
//! Nothing in the pipeline reads the process environment directly; the CLI
//! resolves an [`AppConfig`] once and hands the pipeline a [`PipelineConfig`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Providers with a generation backend implementation.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "deepseek"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .inkpipe/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider ("gemini" or "deepseek")
    pub provider: String,

    /// Explicit model identifier; falls back to the provider default
    pub model: Option<String>,

    /// Template style (file stem in the prompts directory)
    pub style: String,

    /// Seconds to wait between backend calls
    pub rate_limit_delay: u64,

    /// Template directory, relative to the workspace
    pub prompts_dir: PathBuf,

    /// Local HTML output directory, relative to the workspace
    pub output_dir: PathBuf,

    /// Static site root that gets committed, relative to the workspace
    pub publish_dir: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Per-provider credentials and endpoints
    pub providers: HashMap<String, ProviderConfig>,

    /// WeChat draft target settings
    pub wechat: WeChatConfig,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Custom endpoint base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    fn from_env_var(name: &str) -> Self {
        Self {
            api_key_env: name.to_string(),
            endpoint: None,
            timeout: None,
        }
    }
}

/// WeChat official account credentials, all read from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeChatConfig {
    pub app_id_env: String,
    pub app_secret_env: String,
    pub thumb_media_id_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for WeChatConfig {
    fn default() -> Self {
        Self {
            app_id_env: "WECHAT_APP_ID".to_string(),
            app_secret_env: "WECHAT_APP_SECRET".to_string(),
            thumb_media_id_env: "WECHAT_THUMB_MEDIA_ID".to_string(),
            endpoint: None,
        }
    }
}

/// Resolved WeChat credentials.
#[derive(Debug, Clone)]
pub struct WeChatCredentials {
    pub app_id: String,
    pub app_secret: String,
    pub thumb_media_id: String,
    pub endpoint: Option<String>,
}

/// The options the stage pipeline is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub provider: String,
    pub model: String,
    pub style: String,
    /// Fixed pause between consecutive backend calls; zero disables it
    pub rate_limit_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: default_model("gemini").to_string(),
            style: "psychology".to_string(),
            rate_limit_delay: Duration::ZERO,
        }
    }
}

/// Values supplied on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub workspace: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub style: Option<String>,
    pub rate_limit_delay: Option<u64>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    provider: Option<String>,
    model: Option<String>,
    style: Option<String>,
    rate_limit_delay: Option<u64>,
    prompts_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    publish_dir: Option<PathBuf>,
    #[serde(default)]
    providers: HashMap<String, ProviderConfig>,
    wechat: Option<WeChatConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

const GEMINI_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];
const DEEPSEEK_MODELS: &[&str] = &["deepseek-chat", "deepseek-reasoner"];

/// Models offered for a provider, default first. Unknown providers get none.
pub fn provider_models(provider: &str) -> &'static [&'static str] {
    match provider {
        "gemini" => GEMINI_MODELS,
        "deepseek" => DEEPSEEK_MODELS,
        _ => &[],
    }
}

/// Default model for a provider; unknown providers fall back to Gemini's.
pub fn default_model(provider: &str) -> &'static str {
    provider_models(provider)
        .first()
        .copied()
        .unwrap_or(GEMINI_MODELS[0])
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert(
            "gemini".to_string(),
            ProviderConfig::from_env_var("GEMINI_API_KEY"),
        );
        providers.insert(
            "deepseek".to_string(),
            ProviderConfig::from_env_var("DEEPSEEK_API_KEY"),
        );

        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: None,
            style: "psychology".to_string(),
            rate_limit_delay: 10,
            prompts_dir: PathBuf::from("prompts"),
            output_dir: PathBuf::from("output"),
            publish_dir: PathBuf::from("docs"),
            log_level: None,
            verbose: false,
            no_color: false,
            providers,
            wechat: WeChatConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `INKPIPE_WORKSPACE`: Override workspace path
    /// - `INKPIPE_CONFIG`: Path to config file
    /// - `INKPIPE_PROVIDER`: Generation provider
    /// - `INKPIPE_MODEL`: Model identifier
    /// - `INKPIPE_STYLE`: Template style
    /// - `INKPIPE_RATE_LIMIT_DELAY`: Seconds between backend calls
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(&Overrides::default())
    }

    /// Load configuration, letting CLI overrides pick the workspace and
    /// config file before anything is read, then apply the rest on top.
    pub fn load_with(overrides: &Overrides) -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("INKPIPE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }
        if let Some(ref workspace) = overrides.workspace {
            config.workspace = workspace.clone();
        }

        if let Ok(config_file) = std::env::var("INKPIPE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }
        if let Some(ref config_file) = overrides.config_file {
            config.config_file = Some(config_file.clone());
        }

        if !config.workspace.is_dir() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.config_dir().join("config.yaml"));

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.merge_env()?;
        Ok(config.with_overrides(overrides.clone()))
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        self.merge_file(file);
        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    fn merge_file(&mut self, file: ConfigFile) {
        if let Some(provider) = file.provider {
            self.provider = provider.to_lowercase();
        }
        if file.model.is_some() {
            self.model = file.model;
        }
        if let Some(style) = file.style {
            self.style = style;
        }
        if let Some(delay) = file.rate_limit_delay {
            self.rate_limit_delay = delay;
        }
        if let Some(dir) = file.prompts_dir {
            self.prompts_dir = dir;
        }
        if let Some(dir) = file.output_dir {
            self.output_dir = dir;
        }
        if let Some(dir) = file.publish_dir {
            self.publish_dir = dir;
        }
        for (name, provider) in file.providers {
            self.providers.insert(name.to_lowercase(), provider);
        }
        if let Some(wechat) = file.wechat {
            self.wechat = wechat;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }
    }

    /// Environment variables override the config file.
    fn merge_env(&mut self) -> AppResult<()> {
        if let Ok(provider) = std::env::var("INKPIPE_PROVIDER") {
            self.provider = provider.to_lowercase();
        }
        if let Ok(model) = std::env::var("INKPIPE_MODEL") {
            self.model = Some(model);
        }
        if let Ok(style) = std::env::var("INKPIPE_STYLE") {
            self.style = style;
        }
        if let Ok(delay) = std::env::var("INKPIPE_RATE_LIMIT_DELAY") {
            self.rate_limit_delay = delay.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "INKPIPE_RATE_LIMIT_DELAY must be a whole number of seconds, got '{}'",
                    delay
                ))
            })?;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }
        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
        Ok(())
    }

    /// Apply CLI overrides, which take precedence over everything else.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(workspace) = overrides.workspace {
            self.workspace = workspace;
        }
        if let Some(config_file) = overrides.config_file {
            self.config_file = Some(config_file);
        }
        if let Some(provider) = overrides.provider {
            self.provider = provider.to_lowercase();
        }
        if let Some(model) = overrides.model {
            self.model = Some(model);
        }
        if let Some(style) = overrides.style {
            self.style = style;
        }
        if let Some(delay) = overrides.rate_limit_delay {
            self.rate_limit_delay = delay;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }
        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }
        if overrides.no_color {
            self.no_color = true;
        }
        self
    }

    /// The model in effect: explicit choice or the provider default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Get the path to the .inkpipe directory.
    pub fn config_dir(&self) -> PathBuf {
        self.workspace.join(".inkpipe")
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.workspace.join(&self.prompts_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.workspace.join(&self.output_dir)
    }

    pub fn publish_path(&self) -> PathBuf {
        self.workspace.join(&self.publish_dir)
    }

    /// Get the configuration for a provider.
    pub fn provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }

    /// Resolve the API key for a provider from its configured environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> AppResult<String> {
        let provider_config = self.provider_config(provider).ok_or_else(|| {
            AppError::Config(format!("No configuration for provider: {}", provider))
        })?;

        match std::env::var(&provider_config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                provider_config.api_key_env
            ))),
        }
    }

    /// Resolve WeChat credentials; every value must be present.
    pub fn resolve_wechat(&self) -> AppResult<WeChatCredentials> {
        let read = |var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "WeChat configuration incomplete: {} is not set",
                        var
                    ))
                })
        };

        Ok(WeChatCredentials {
            app_id: read(&self.wechat.app_id_env)?,
            app_secret: read(&self.wechat.app_secret_env)?,
            thumb_media_id: read(&self.wechat.thumb_media_id_env)?,
            endpoint: self.wechat.endpoint.clone(),
        })
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        self.resolve_api_key(&self.provider)?;
        Ok(())
    }

    /// Options handed to the stage pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            provider: self.provider.clone(),
            model: self.model().to_string(),
            style: self.style.clone(),
            rate_limit_delay: Duration::from_secs(self.rate_limit_delay),
        }
    }
}
