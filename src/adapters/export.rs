//! ZIP export of stored lists: one CSV per list plus a `manifest.json`.

use crate::core::schema::REQUIRED_COLUMNS;
use crate::domain::model::ListOverview;
use crate::domain::ports::Storage;
use crate::utils::error::{LeadError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use uuid::Uuid;
use zip::write::{SimpleFileOptions, ZipWriter};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub file: String,
    pub list_id: Uuid,
    pub agent_id: String,
    pub agent_name: Option<String>,
    pub item_count: usize,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

pub fn list_file_name(overview: &ListOverview) -> String {
    let owner = overview
        .agent_name
        .as_deref()
        .unwrap_or(overview.list.agent_id.as_str());
    let safe: String = owner
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}.csv", safe, overview.list.id)
}

pub fn list_to_csv(overview: &ListOverview) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REQUIRED_COLUMNS)?;
    for item in &overview.list.items {
        writer.write_record([&item.first_name, &item.phone, &item.notes])?;
    }
    writer
        .into_inner()
        .map_err(|e| LeadError::IoError(e.into_error()))
}

pub fn build_bundle(lists: &[ListOverview]) -> Result<(Vec<u8>, Vec<ManifestEntry>)> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let mut manifest = Vec::with_capacity(lists.len());

    for overview in lists {
        let file = list_file_name(overview);
        zip.start_file(file.as_str(), SimpleFileOptions::default())?;
        zip.write_all(&list_to_csv(overview)?)?;

        manifest.push(ManifestEntry {
            file,
            list_id: overview.list.id,
            agent_id: overview.list.agent_id.clone(),
            agent_name: overview.agent_name.clone(),
            item_count: overview.list.items.len(),
            uploaded_by: overview.list.uploaded_by.clone(),
            created_at: overview.list.created_at,
        });
    }

    zip.start_file("manifest.json", SimpleFileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok((cursor.into_inner(), manifest))
}

/// Writes the bundle to `path` through `storage` and returns the manifest.
pub async fn export_lists<S: Storage>(
    storage: &S,
    path: &str,
    lists: &[ListOverview],
) -> Result<Vec<ManifestEntry>> {
    let (bytes, manifest) = build_bundle(lists)?;
    tracing::debug!("Writing export bundle ({} bytes) to {}", bytes.len(), path);
    storage.write_file(path, &bytes).await?;
    tracing::info!("📁 Exported {} lists to {}", manifest.len(), path);
    Ok(manifest)
}
