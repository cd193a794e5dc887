//! Even-split distribution of leads across the agent roster.
//!
//! With `n` leads and `m` agents every agent gets `n / m` leads and the first
//! `n % m` agents in roster order get one more. Leads are handed out with a
//! single cursor in input order, so concatenating the slices in roster order
//! gives back the input. Agents left with nothing are skipped.

use crate::domain::model::{Agent, DistributionResult, LeadRecord, ListPartition};
use crate::domain::ports::{AgentRoster, ListStore};
use crate::utils::error::{LeadError, Result};
use chrono::Utc;

/// One agent's contiguous share of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation<'a> {
    pub agent: &'a Agent,
    pub items: &'a [LeadRecord],
}

/// Slice sizes per agent, in roster order, including zeros.
pub fn split_sizes(item_count: usize, agent_count: usize) -> Result<Vec<usize>> {
    if agent_count == 0 {
        return Err(LeadError::NoAgents);
    }

    let base = item_count / agent_count;
    let remainder = item_count % agent_count;

    Ok((0..agent_count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

pub fn allocate<'a>(items: &'a [LeadRecord], agents: &'a [Agent]) -> Result<Vec<Allocation<'a>>> {
    let sizes = split_sizes(items.len(), agents.len())?;

    let mut cursor = 0;
    let mut allocations = Vec::with_capacity(agents.len());
    for (agent, size) in agents.iter().zip(sizes) {
        let slice = &items[cursor..cursor + size];
        cursor += size;
        if !slice.is_empty() {
            allocations.push(Allocation {
                agent,
                items: slice,
            });
        }
    }

    debug_assert_eq!(cursor, items.len());
    Ok(allocations)
}

/// Persists allocations as lists inside one transaction.
///
/// Saves run sequentially in roster order. If any save fails the transaction is
/// rolled back, so an upload is stored completely or not at all.
pub async fn persist_allocations<L>(
    store: &L,
    allocations: &[Allocation<'_>],
    uploaded_by: &str,
) -> Result<Vec<DistributionResult>>
where
    L: ListStore + ?Sized,
{
    if allocations.is_empty() {
        return Ok(Vec::new());
    }

    let created_at = Utc::now();
    let mut tx = store.begin().await?;
    let mut results = Vec::with_capacity(allocations.len());

    for allocation in allocations {
        let partition = ListPartition {
            agent_id: allocation.agent.id.clone(),
            items: allocation.items.to_vec(),
            uploaded_by: uploaded_by.to_string(),
            created_at,
        };

        match tx.save(&partition).await {
            Ok(list_id) => {
                tracing::debug!(
                    "Assigned {} leads to {} ({}) as list {}",
                    partition.items.len(),
                    allocation.agent.name,
                    allocation.agent.id,
                    list_id
                );
                results.push(DistributionResult {
                    agent_id: allocation.agent.id.clone(),
                    agent_name: allocation.agent.name.clone(),
                    item_count: partition.items.len(),
                    list_id,
                });
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Saving list for agent {} failed, rolling back {} saved list(s): {}",
                    allocation.agent.id,
                    results.len(),
                    e
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("❌ Rollback failed: {}", rollback_err);
                }
                return Err(LeadError::PersistenceFailure {
                    agent_id: allocation.agent.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tx.commit().await?;
    Ok(results)
}

pub struct DistributionEngine<R: AgentRoster, L: ListStore> {
    roster: R,
    store: L,
}

impl<R: AgentRoster, L: ListStore> DistributionEngine<R, L> {
    pub fn new(roster: R, store: L) -> Self {
        Self { roster, store }
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn roster(&self) -> &R {
        &self.roster
    }

    /// Reads the roster once, splits `items` across it and stores one list per
    /// agent that received leads.
    pub async fn distribute(
        &self,
        items: &[LeadRecord],
        uploaded_by: &str,
    ) -> Result<Vec<DistributionResult>> {
        let agents = self.roster.list_active_agents().await?;
        self.distribute_to(items, &agents, uploaded_by).await
    }

    pub async fn distribute_to(
        &self,
        items: &[LeadRecord],
        agents: &[Agent],
        uploaded_by: &str,
    ) -> Result<Vec<DistributionResult>> {
        let allocations = allocate(items, agents)?;
        tracing::info!(
            "📦 Distributing {} leads across {} agents ({} receive leads)",
            items.len(),
            agents.len(),
            allocations.len()
        );
        persist_allocations(&self.store, &allocations, uploaded_by).await
    }
}
