use crate::domain::model::{Agent, ListId, ListPartition, StoredList};
use crate::domain::ports::{AgentRoster, ListStore, ListTransaction};
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryState {
    agents: Vec<Agent>,
    lists: Vec<StoredList>,
}

/// In-process roster and list store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn with_agents(agents: Vec<Agent>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                agents,
                lists: Vec::new(),
            })),
        }
    }

    pub async fn add_agent(&self, agent: Agent) -> Result<()> {
        let mut state = self.state.lock().await;
        if state
            .agents
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(&agent.email))
        {
            return Err(LeadError::DuplicateAgent { email: agent.email });
        }
        state.agents.push(agent);
        Ok(())
    }

    pub async fn remove_agent(&self, agent_id: &str) -> bool {
        let mut state = self.state.lock().await;
        let before = state.agents.len();
        state.agents.retain(|a| a.id != agent_id);
        state.agents.len() != before
    }
}

#[async_trait]
impl AgentRoster for MemoryStore {
    async fn list_active_agents(&self) -> Result<Vec<Agent>> {
        Ok(self.state.lock().await.agents.clone())
    }
}

/// Saves are staged locally and only appended to the store on commit.
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    staged: Vec<StoredList>,
    finished: bool,
}

#[async_trait]
impl<'a> ListTransaction for MemoryTransaction<'a> {
    async fn save(&mut self, partition: &ListPartition) -> Result<ListId> {
        if self.finished {
            return Err(LeadError::StorageError {
                message: "transaction already finished".to_string(),
            });
        }
        let id = Uuid::new_v4();
        self.staged.push(StoredList::from_partition(id, partition));
        Ok(id)
    }

    async fn commit(&mut self) -> Result<()> {
        if self.finished {
            return Err(LeadError::StorageError {
                message: "transaction already finished".to_string(),
            });
        }
        self.finished = true;
        let mut state = self.store.state.lock().await;
        state.lists.append(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.finished = true;
        self.staged.clear();
        Ok(())
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn ListTransaction + '_>> {
        Ok(Box::new(MemoryTransaction {
            store: self,
            staged: Vec::new(),
            finished: false,
        }))
    }

    async fn lists_for_agent(&self, agent_id: &str) -> Result<Vec<StoredList>> {
        let state = self.state.lock().await;
        Ok(state
            .lists
            .iter()
            .filter(|l| l.agent_id == agent_id)
            .cloned()
            .collect())
    }

    async fn all_lists(&self) -> Result<Vec<StoredList>> {
        Ok(self.state.lock().await.lists.clone())
    }
}
