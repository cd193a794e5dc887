pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpRoster, LocalStorage, MemoryStore, SqliteStore};
pub use config::AppConfig;
pub use core::{
    distribution::DistributionEngine,
    upload::{UploadOptions, UploadService},
};
pub use utils::error::{LeadError, Result};
