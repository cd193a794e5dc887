use crate::adapters::export::{self, ManifestEntry};
use crate::core::distribution::DistributionEngine;
use crate::core::normalizer;
use crate::core::parser::{self, ParseOptions};
use crate::core::schema;
use crate::domain::model::{FileFormat, LeadRecord, ListOverview, StoredList, UploadSummary};
use crate::domain::ports::{AgentRoster, ListStore, Storage};
use crate::utils::error::{LeadError, Result};
use std::collections::HashMap;

pub const DEFAULT_MAX_FILE_BYTES: usize = 5_000_000;

#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    pub max_file_bytes: usize,
    pub parse: ParseOptions,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            parse: ParseOptions::default(),
        }
    }
}

/// Turns raw upload bytes into normalized leads: size limit, parse, schema check, normalize.
///
/// Nothing is persisted here.
pub fn prepare_leads(bytes: &[u8], format: FileFormat, options: &UploadOptions) -> Result<Vec<LeadRecord>> {
    if bytes.len() > options.max_file_bytes {
        return Err(LeadError::FileTooLarge {
            size: bytes.len(),
            limit: options.max_file_bytes,
        });
    }

    let table = parser::parse_with_header_check(bytes, format, &options.parse, schema::check_headers)?;
    tracing::debug!("Parsed {} rows", table.rows.len());

    schema::validate(&table)?;
    Ok(normalizer::normalize(&table.rows))
}

/// Upload flow plus the read side (per-agent lists, overview, export).
pub struct UploadService<S: Storage, R: AgentRoster, L: ListStore> {
    storage: S,
    engine: DistributionEngine<R, L>,
    options: UploadOptions,
}

impl<S: Storage, R: AgentRoster, L: ListStore> UploadService<S, R, L> {
    pub fn new(storage: S, roster: R, store: L, options: UploadOptions) -> Self {
        Self {
            storage,
            engine: DistributionEngine::new(roster, store),
            options,
        }
    }

    pub fn engine(&self) -> &DistributionEngine<R, L> {
        &self.engine
    }

    /// Reads `file_name` from storage and distributes it. The extension is checked
    /// before the file is read.
    pub async fn upload_file(&self, file_name: &str, uploaded_by: &str) -> Result<UploadSummary> {
        let format = FileFormat::from_file_name(file_name)?;
        tracing::info!("📥 Reading upload {} ({})", file_name, format.as_str());
        let bytes = self.storage.read_file(file_name).await?;
        self.distribute_bytes(file_name, format, &bytes, uploaded_by)
            .await
    }

    pub async fn upload_bytes(
        &self,
        file_name: &str,
        bytes: &[u8],
        uploaded_by: &str,
    ) -> Result<UploadSummary> {
        let format = FileFormat::from_file_name(file_name)?;
        self.distribute_bytes(file_name, format, bytes, uploaded_by)
            .await
    }

    async fn distribute_bytes(
        &self,
        file_name: &str,
        format: FileFormat,
        bytes: &[u8],
        uploaded_by: &str,
    ) -> Result<UploadSummary> {
        let leads = prepare_leads(bytes, format, &self.options)?;
        tracing::info!("✅ {} leads validated from {}", leads.len(), file_name);

        let distributions = self.engine.distribute(&leads, uploaded_by).await?;
        tracing::info!(
            "✅ {} leads distributed to {} agents",
            leads.len(),
            distributions.len()
        );

        Ok(UploadSummary {
            message: "File uploaded and distributed successfully".to_string(),
            file_name: file_name.to_string(),
            format,
            total_items: leads.len(),
            distributions,
        })
    }

    pub async fn lists_for_agent(&self, agent_id: &str) -> Result<Vec<StoredList>> {
        let lists = self.engine.store().lists_for_agent(agent_id).await?;
        if lists.is_empty() {
            return Err(LeadError::ListsNotFound {
                agent_id: agent_id.to_string(),
            });
        }
        Ok(lists)
    }

    /// All stored lists with agent name and email joined in from the current
    /// roster. Lists whose agent has since left the roster carry `None`.
    pub async fn list_overview(&self) -> Result<Vec<ListOverview>> {
        let lists = self.engine.store().all_lists().await?;
        let agents = self.engine.roster().list_active_agents().await?;
        let by_id: HashMap<&str, _> = agents.iter().map(|a| (a.id.as_str(), a)).collect();

        Ok(lists
            .into_iter()
            .map(|list| {
                let agent = by_id.get(list.agent_id.as_str());
                ListOverview {
                    agent_name: agent.map(|a| a.name.clone()),
                    agent_email: agent.map(|a| a.email.clone()),
                    list,
                }
            })
            .collect())
    }

    /// Exports all lists, or one agent's lists, as a zip bundle at `path`.
    pub async fn export(&self, path: &str, agent_id: Option<&str>) -> Result<Vec<ManifestEntry>> {
        let mut overview = self.list_overview().await?;
        if let Some(agent_id) = agent_id {
            overview.retain(|o| o.list.agent_id == agent_id);
            if overview.is_empty() {
                return Err(LeadError::ListsNotFound {
                    agent_id: agent_id.to_string(),
                });
            }
        }
        export::export_lists(&self.storage, path, &overview).await
    }
}
