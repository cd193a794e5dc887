// Adapters layer: concrete implementations of the domain ports
// (filesystem, sqlite, http roster, in-memory) plus the zip exporter.

pub mod export;
pub mod http_roster;
pub mod local_storage;
pub mod memory;
pub mod sqlite;

pub use http_roster::HttpRoster;
pub use local_storage::LocalStorage;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
