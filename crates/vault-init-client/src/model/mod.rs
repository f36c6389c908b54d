// Model types for the Vault system API

pub mod health;
pub mod init;

pub use health::ClusterState;
pub use init::{InitRequest, InitResponse};
