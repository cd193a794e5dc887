use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("Unsupported file format: .{extension} (allowed: csv, xlsx, xls)")]
    UnsupportedFormat { extension: String },

    #[error("Malformed row at line {line}: expected {expected} values, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("File contains no data rows")]
    EmptyFile,

    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("No agents found to distribute lists")]
    NoAgents,

    #[error("Failed to persist list for agent {agent_id}: {reason}")]
    PersistenceFailure { agent_id: String, reason: String },

    #[error("Uploaded file is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    #[error("No lists found for agent {agent_id}")]
    ListsNotFound { agent_id: String },

    #[error("Agent not found: {agent_id}")]
    AgentNotFound { agent_id: String },

    #[error("Agent with email {email} already exists")]
    DuplicateAgent { email: String },

    #[error("Spreadsheet error: {message}")]
    SpreadsheetError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 上傳檔案本身的問題 (格式、欄位、內容)
    Input,
    /// 分配前置條件不足 (例如沒有 agent)
    Distribution,
    /// 資料庫或檔案系統
    Storage,
    Network,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LeadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::UnsupportedFormat { .. }
            | LeadError::MalformedRow { .. }
            | LeadError::EmptyFile
            | LeadError::MissingColumns { .. }
            | LeadError::FileTooLarge { .. }
            | LeadError::SpreadsheetError { .. }
            | LeadError::CsvError(_) => ErrorCategory::Input,
            LeadError::NoAgents
            | LeadError::ListsNotFound { .. }
            | LeadError::AgentNotFound { .. }
            | LeadError::DuplicateAgent { .. } => ErrorCategory::Distribution,
            LeadError::PersistenceFailure { .. }
            | LeadError::StorageError { .. }
            | LeadError::DatabaseError(_)
            | LeadError::IoError(_)
            | LeadError::ZipError(_)
            | LeadError::SerializationError(_) => ErrorCategory::Storage,
            LeadError::ApiError(_) => ErrorCategory::Network,
            LeadError::ConfigError { .. }
            | LeadError::MissingConfigError { .. }
            | LeadError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Distribution => match self {
                LeadError::ListsNotFound { .. } => ErrorSeverity::Low,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::UnsupportedFormat { .. } => {
                "Convert the file to CSV, XLSX or XLS and upload again".to_string()
            }
            LeadError::MalformedRow { line, .. } => {
                format!("Fix the number of values on line {} to match the header", line)
            }
            LeadError::EmptyFile => "Add at least one data row below the header".to_string(),
            LeadError::MissingColumns { columns } => format!(
                "Add the column(s) {} to the header row (case does not matter)",
                columns.join(", ")
            ),
            LeadError::NoAgents => "Create at least one agent before uploading".to_string(),
            LeadError::PersistenceFailure { .. } => {
                "Nothing from this upload was saved; retry once the database is reachable"
                    .to_string()
            }
            LeadError::FileTooLarge { limit, .. } => {
                format!("Split the file into parts smaller than {} bytes", limit)
            }
            LeadError::ListsNotFound { .. } => {
                "Upload a file to distribute leads to this agent".to_string()
            }
            LeadError::DuplicateAgent { .. } => "Use a different email address".to_string(),
            LeadError::AgentNotFound { .. } => {
                "Run `agents list` to see the current roster".to_string()
            }
            LeadError::ApiError(_) => "Check the roster endpoint and network".to_string(),
            LeadError::ConfigError { .. }
            | LeadError::MissingConfigError { .. }
            | LeadError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            _ => "Check the logs for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LeadError::MissingColumns { .. } => {
                "File must include FirstName, Phone, and Notes columns".to_string()
            }
            LeadError::EmptyFile => "No valid data found in the file".to_string(),
            LeadError::UnsupportedFormat { .. } => {
                "Invalid file format. Only CSV, XLSX, and XLS are allowed.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;
