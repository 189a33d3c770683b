pub mod config;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod metrics_api;
pub mod model;
pub mod providers;
pub mod report;
pub mod store;
pub mod translate;

pub use config::ProviderConfig;
pub use errors::{ConfigError, StoreError};
pub use model::{Record, ScoreEntry};
pub use store::RecordStore;
