use crate::utils::error::{LeadError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

pub type ListId = Uuid;

/// 上傳檔案的容器格式，只由副檔名判斷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            other => Err(LeadError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
        }
    }
}

/// One data row as read from the file: `(header, value)` pairs in column order,
/// with the header text exactly as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub data: Vec<(String, String)>,
}

impl RawRow {
    /// Value of the first column whose header is exactly `header`.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub first_name: String,
    pub phone: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
}

/// The slice of one upload assigned to a single agent, before it has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPartition {
    pub agent_id: String,
    pub items: Vec<LeadRecord>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredList {
    pub id: ListId,
    pub agent_id: String,
    pub items: Vec<LeadRecord>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

impl StoredList {
    pub fn from_partition(id: ListId, partition: &ListPartition) -> Self {
        Self {
            id,
            agent_id: partition.agent_id.clone(),
            items: partition.items.clone(),
            uploaded_by: partition.uploaded_by.clone(),
            created_at: partition.created_at,
        }
    }
}

/// 列表加上 agent 基本資料，給總覽與匯出使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOverview {
    #[serde(flatten)]
    pub list: StoredList,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    pub agent_id: String,
    pub agent_name: String,
    pub item_count: usize,
    pub list_id: ListId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub message: String,
    pub file_name: String,
    pub format: FileFormat,
    pub total_items: usize,
    pub distributions: Vec<DistributionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(FileFormat::from_file_name("leads.csv").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_file_name("Leads.XLSX").unwrap(), FileFormat::Xlsx);
        assert_eq!(FileFormat::from_file_name("old.xls").unwrap(), FileFormat::Xls);
    }

    #[test]
    fn test_unsupported_format() {
        match FileFormat::from_file_name("leads.txt") {
            Err(LeadError::UnsupportedFormat { extension }) => assert_eq!(extension, "txt"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            FileFormat::from_file_name("no_extension"),
            Err(LeadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_agent_accepts_mongo_style_id() {
        let agent: Agent = serde_json::from_value(serde_json::json!({
            "_id": "65f0c0ffee",
            "name": "Asha",
            "email": "asha@example.com",
            "mobile": "+15550001"
        }))
        .unwrap();
        assert_eq!(agent.id, "65f0c0ffee");
    }

    #[test]
    fn test_distribution_result_uses_camel_case() {
        let result = DistributionResult {
            agent_id: "a1".to_string(),
            agent_name: "Asha".to_string(),
            item_count: 3,
            list_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["agentId"], "a1");
        assert_eq!(json["itemCount"], 3);
        assert!(json.get("listId").is_some());
    }
}
