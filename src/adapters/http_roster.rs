use crate::domain::model::Agent;
use crate::domain::ports::AgentRoster;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Roster served by the agent management API (`GET <endpoint>` returning a JSON
/// array of agents). The array order is the roster order.
pub struct HttpRoster {
    endpoint: String,
    client: Client,
}

impl HttpRoster {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl AgentRoster for HttpRoster {
    async fn list_active_agents(&self) -> Result<Vec<Agent>> {
        tracing::debug!("Fetching agent roster from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        tracing::debug!("Roster response status: {}", response.status());

        let agents: Vec<Agent> = response.error_for_status()?.json().await?;
        tracing::info!("👥 Roster loaded: {} agents", agents.len());
        Ok(agents)
    }
}
