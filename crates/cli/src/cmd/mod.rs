//! CLI command implementations

pub mod config;
pub mod create;
pub mod db;
pub mod dev;
pub mod generate;
