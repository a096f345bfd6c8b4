//! CLI, HTTP client, output rendering, actions
//!
//! This crate provides the `quickmeet` command-line interface.

pub mod actions;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;

pub use api::ApiClient;
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
