//! Configuration model and constants

pub mod config;
pub mod constants;
