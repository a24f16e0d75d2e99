pub mod connection;
pub mod fixtures;
pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod store;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{DemoSeedDataset, RequestSeedInfo, SeedResult, SeedVerification};
pub use memory::InMemoryWorkflowStore;
pub use sqlite::SqliteWorkflowStore;
pub use store::{StoreError, WorkflowStore};
