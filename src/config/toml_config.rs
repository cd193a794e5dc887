use crate::core::parser::ParseOptions;
use crate::core::upload::{UploadOptions, DEFAULT_MAX_FILE_BYTES};
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "lead-splitter.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_bytes: Option<usize>,
    pub csv_delimiter: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: Some(DEFAULT_MAX_FILE_BYTES),
            csv_delimiter: Some(",".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterSource {
    #[default]
    Database,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub source: RosterSource,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./exports".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeadError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LeadError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ROSTER_URL})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| LeadError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn max_file_bytes(&self) -> usize {
        self.upload.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES)
    }

    pub fn csv_delimiter(&self) -> Result<u8> {
        match &self.upload.csv_delimiter {
            Some(delimiter) => validation::validate_delimiter("upload.csv_delimiter", delimiter),
            None => Ok(b','),
        }
    }

    pub fn roster_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.roster.timeout_seconds.unwrap_or(10))
    }

    pub fn upload_options(&self) -> Result<UploadOptions> {
        Ok(UploadOptions {
            max_file_bytes: self.max_file_bytes(),
            parse: ParseOptions {
                delimiter: self.csv_delimiter()?,
            },
        })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("database.path", &self.database.path)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;
        validation::validate_positive_number("upload.max_file_bytes", self.max_file_bytes(), 1)?;
        self.csv_delimiter()?;

        if self.roster.source == RosterSource::Http {
            let endpoint = validation::validate_required_field("roster.endpoint", &self.roster.endpoint)?;
            validation::validate_url("roster.endpoint", endpoint)?;
        }

        Ok(())
    }
}
