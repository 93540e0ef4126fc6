// Library exports for the Maratron CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
pub mod storage;
