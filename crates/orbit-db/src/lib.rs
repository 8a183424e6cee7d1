pub mod connection;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use connection::{Database, DatabaseConfig};
pub use error::{DbError, Result};
pub use models::DbDailyUsage;
pub use queries::daily_usage::DailyUsageQueries;
pub use store::HistoryStore;
