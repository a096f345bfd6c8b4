//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod instant;
pub mod schedule;
pub mod server;
pub mod status;
