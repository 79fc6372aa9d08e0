pub mod config;
pub mod errors;
pub mod transaction;

pub use config::{Config, DetectionConfig};
pub use errors::{EngineError, Result};
pub use transaction::{parse_timestamp, Transaction, TransactionTable};
