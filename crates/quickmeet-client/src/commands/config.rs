//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
///
/// A client-secret file that is present must also parse; a missing one is
/// only a warning since `auth` cannot run before it is downloaded.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;

    let google = config.google_config();
    if google.credentials_path.exists() {
        google.load_credentials()?;
    } else {
        println!(
            "warning: client-secret file {} does not exist yet",
            google.credentials_path.display()
        );
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
