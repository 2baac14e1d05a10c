use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::errors::PipelineError;

/// Environment names for the hosted services. These are the deployment
/// contract and are read verbatim, unprefixed.
pub const ENV_AI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_AI_API_KEY_ALIAS: &str = "API_KEY";
pub const ENV_AI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_STORAGE_URL: &str = "SUPABASE_URL";
pub const ENV_STORAGE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_EMAIL_API_KEY: &str = "RESEND_API_KEY";
pub const ENV_ADMIN_EMAIL: &str = "ADMIN_EMAIL";
pub const ENV_FROM_ADDRESS: &str = "RESEND_FROM";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ADMIN_EMAIL: &str = "formconverts@gmail.com";
pub const DEFAULT_FROM_ADDRESS: &str = "FORM Creative <onboarding@resend.dev>";

const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_EMAIL_BASE_URL: &str = "https://api.resend.com";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
    pub leads: LeadsConfig,
    pub mailer: MailerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Directory holding the prebuilt marketing pages served as static
    /// files.
    pub site_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// Absent until the deployment provides it; the chat pipeline checks
    /// per request.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct LeadsConfig {
    pub service_url: Option<String>,
    pub service_key: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct MailerConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub admin_email: String,
    pub from_address: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                site_dir: PathBuf::from("dist"),
            },
            assistant: AssistantConfig {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_AI_BASE_URL.to_string(),
            },
            leads: LeadsConfig { service_url: None, service_key: None },
            mailer: MailerConfig {
                api_key: None,
                base_url: DEFAULT_EMAIL_BASE_URL.to_string(),
                admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
                from_address: DEFAULT_FROM_ADDRESS.to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Loads configuration in layers: defaults, then the optional
    /// `formsite.toml`, then the environment. Hosted-service credentials
    /// stay optional here - each pipeline resolves its own per request.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("formsite.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(site_dir) = server.site_dir {
                self.server.site_dir = PathBuf::from(site_dir);
            }
        }

        if let Some(assistant) = patch.assistant {
            if let Some(api_key_value) = assistant.api_key {
                self.assistant.api_key = Some(secret_value(api_key_value));
            }
            if let Some(model) = assistant.model {
                self.assistant.model = model;
            }
            if let Some(base_url) = assistant.base_url {
                self.assistant.base_url = base_url;
            }
        }

        if let Some(leads) = patch.leads {
            if let Some(service_url) = leads.service_url {
                self.leads.service_url = Some(service_url);
            }
            if let Some(service_key_value) = leads.service_key {
                self.leads.service_key = Some(secret_value(service_key_value));
            }
        }

        if let Some(mailer) = patch.mailer {
            if let Some(api_key_value) = mailer.api_key {
                self.mailer.api_key = Some(secret_value(api_key_value));
            }
            if let Some(base_url) = mailer.base_url {
                self.mailer.base_url = base_url;
            }
            if let Some(admin_email) = mailer.admin_email {
                self.mailer.admin_email = admin_email;
            }
            if let Some(from_address) = mailer.from_address {
                self.mailer.from_address = from_address;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("FORMSITE_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("FORMSITE_PORT") {
            self.server.port = parse_u16("FORMSITE_PORT", &value)?;
        }
        if let Some(value) = read_env("FORMSITE_SITE_DIR") {
            self.server.site_dir = PathBuf::from(value);
        }

        let api_key = read_env(ENV_AI_API_KEY).or_else(|| read_env(ENV_AI_API_KEY_ALIAS));
        if let Some(value) = api_key {
            self.assistant.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env(ENV_AI_MODEL) {
            self.assistant.model = value;
        }
        if let Some(value) = read_env("FORMSITE_AI_BASE_URL") {
            self.assistant.base_url = value;
        }

        if let Some(value) = read_env(ENV_STORAGE_URL) {
            self.leads.service_url = Some(value);
        }
        if let Some(value) = read_env(ENV_STORAGE_KEY) {
            self.leads.service_key = Some(secret_value(value));
        }

        if let Some(value) = read_env(ENV_EMAIL_API_KEY) {
            self.mailer.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("FORMSITE_EMAIL_BASE_URL") {
            self.mailer.base_url = value;
        }
        if let Some(value) = read_env(ENV_ADMIN_EMAIL) {
            self.mailer.admin_email = value;
        }
        if let Some(value) = read_env(ENV_FROM_ADDRESS) {
            self.mailer.from_address = value;
        }

        if let Some(value) = read_env("FORMSITE_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("FORMSITE_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    /// Shape validation only. Credential presence is deliberately not
    /// checked here - a deployment without keys still serves, and the
    /// pipelines answer 500 per request until the environment is fixed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_assistant(&self.assistant)?;
        validate_leads(&self.leads)?;
        validate_mailer(&self.mailer)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

impl AssistantConfig {
    pub fn require_api_key(&self) -> Result<&SecretString, PipelineError> {
        self.api_key
            .as_ref()
            .ok_or(PipelineError::ConfigurationMissing { name: ENV_AI_API_KEY })
    }
}

impl LeadsConfig {
    /// Resolves both storage credentials, naming the first absent variable.
    pub fn require_credentials(&self) -> Result<(&str, &SecretString), PipelineError> {
        let url = self
            .service_url
            .as_deref()
            .ok_or(PipelineError::ConfigurationMissing { name: ENV_STORAGE_URL })?;
        let key = self
            .service_key
            .as_ref()
            .ok_or(PipelineError::ConfigurationMissing { name: ENV_STORAGE_KEY })?;
        Ok((url, key))
    }
}

impl MailerConfig {
    pub fn require_api_key(&self) -> Result<&SecretString, PipelineError> {
        self.api_key
            .as_ref()
            .ok_or(PipelineError::ConfigurationMissing { name: ENV_EMAIL_API_KEY })
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("formsite.toml"), PathBuf::from("config/formsite.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    Ok(())
}

fn validate_assistant(assistant: &AssistantConfig) -> Result<(), ConfigError> {
    if assistant.model.trim().is_empty() {
        return Err(ConfigError::Validation("assistant.model must not be empty".to_string()));
    }
    validate_http_url("assistant.base_url", &assistant.base_url)?;
    Ok(())
}

fn validate_leads(leads: &LeadsConfig) -> Result<(), ConfigError> {
    if let Some(url) = &leads.service_url {
        validate_http_url("leads.service_url", url)?;
    }
    Ok(())
}

fn validate_mailer(mailer: &MailerConfig) -> Result<(), ConfigError> {
    validate_http_url("mailer.base_url", &mailer.base_url)?;
    if !mailer.admin_email.contains('@') {
        return Err(ConfigError::Validation(
            "mailer.admin_email must be an email address".to_string(),
        ));
    }
    if mailer.from_address.trim().is_empty() {
        return Err(ConfigError::Validation("mailer.from_address must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_http_url(key: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must start with http:// or https://")))
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    assistant: Option<AssistantPatch>,
    leads: Option<LeadsPatch>,
    mailer: Option<MailerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    site_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantPatch {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LeadsPatch {
    service_url: Option<String>,
    service_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MailerPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    admin_email: Option<String>,
    from_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
