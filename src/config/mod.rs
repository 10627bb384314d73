// Config layer - Environment-driven infrastructure configuration
pub mod database;
pub mod logging;
pub mod settings;

pub use database::DatabaseConnections;
pub use logging::{init_logging, LoggingConfig};
pub use settings::BootstrapSettings;
