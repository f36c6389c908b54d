//! vault-init: waits for a Vault cluster to report that it is uninitialized,
//! initializes it once, and stores the root token and recovery keys in a
//! secret store.

pub mod bootstrap;
pub mod error;
pub mod health;
pub mod initializer;
pub mod model;
pub mod startup;

pub use bootstrap::Bootstrapper;
pub use error::{ConfigError, InitError, PersistError};
pub use health::HealthMonitor;
pub use initializer::{InitAttempt, Initializer};
pub use model::config::Configuration;
