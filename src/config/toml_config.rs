use crate::core::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    pub environment: Environment,
    pub content_path: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "Site vitrine".to_string(),
            environment: Environment::Development,
            content_path: "content/site.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackend {
    #[default]
    Console,
    Smtp,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub backend: EmailBackend,
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            backend: EmailBackend::Console,
            host: "smtp.gmail.com".to_string(),
            port: 587,
            use_tls: true,
            username: None,
            password: None,
        }
    }
}

/// A `${VAR}` left in place because the variable was not set.
fn is_unresolved(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}')
}

impl EmailConfig {
    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .filter(|v| !v.is_empty() && !is_unresolved(v))
    }

    pub fn password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|v| !v.is_empty() && !is_unresolved(v))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub submissions_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            submissions_path: "data/submissions.jsonl".to_string(),
        }
    }
}

fn env_var_regex() -> &'static Regex {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${EMAIL_HOST_USER})
    fn substitute_env_vars(content: &str) -> String {
        env_var_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("site.name", &self.site.name)?;
        validate_path("site.content_path", &self.site.content_path)?;
        validate_path("storage.submissions_path", &self.storage.submissions_path)?;

        if self.email.backend == EmailBackend::Smtp {
            validate_non_empty_string("email.host", &self.email.host)?;
            validate_range("email.port", self.email.port, 1, u16::MAX)?;
            if self.email.username().is_some() != self.email.password().is_some() {
                return Err(SiteError::InvalidConfigValueError {
                    field: "email.username".to_string(),
                    value: self.email.username.clone().unwrap_or_default(),
                    reason: "username and password must be set together".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.site.environment == Environment::Production
    }
}

impl ConfigProvider for SiteConfig {
    fn site_name(&self) -> &str {
        &self.site.name
    }

    fn is_production(&self) -> bool {
        self.is_production()
    }

    fn content_path(&self) -> &str {
        &self.site.content_path
    }

    fn submissions_path(&self) -> &str {
        &self.storage.submissions_path
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
