use crate::domain::model::{Agent, ListId, ListPartition, StoredList};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Read-only view of the agents that can receive leads.
///
/// Called once per distribution; the returned order is the roster order the
/// even split is computed against.
#[async_trait]
pub trait AgentRoster: Send + Sync {
    async fn list_active_agents(&self) -> Result<Vec<Agent>>;
}

/// One unit of work against a [`ListStore`]. Nothing saved through it is visible
/// to readers until `commit` succeeds; `rollback` discards every save.
#[async_trait]
pub trait ListTransaction: Send {
    async fn save(&mut self, partition: &ListPartition) -> Result<ListId>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;
}

#[async_trait]
pub trait ListStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ListTransaction + '_>>;
    async fn lists_for_agent(&self, agent_id: &str) -> Result<Vec<StoredList>>;
    async fn all_lists(&self) -> Result<Vec<StoredList>>;
}

#[async_trait]
impl<T: AgentRoster + ?Sized> AgentRoster for Box<T> {
    async fn list_active_agents(&self) -> Result<Vec<Agent>> {
        (**self).list_active_agents().await
    }
}

#[async_trait]
impl<T: ListStore + ?Sized> ListStore for Box<T> {
    async fn begin(&self) -> Result<Box<dyn ListTransaction + '_>> {
        (**self).begin().await
    }

    async fn lists_for_agent(&self, agent_id: &str) -> Result<Vec<StoredList>> {
        (**self).lists_for_agent(agent_id).await
    }

    async fn all_lists(&self) -> Result<Vec<StoredList>> {
        (**self).all_lists().await
    }
}
