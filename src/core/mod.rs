pub mod distribution;
pub mod normalizer;
pub mod parser;
pub mod schema;
pub mod upload;

pub use crate::domain::model::{Agent, DistributionResult, LeadRecord, ListPartition, RawRow};
pub use crate::domain::ports::{AgentRoster, ListStore, ListTransaction, Storage};
pub use crate::utils::error::Result;
