//! Server configuration.
//!
//! Reads `/etc/openledger/<name>.toml`, or an explicit path.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding all persistent data.
    pub data_dir: String,
}

impl ServerConfig {
    /// Resolve a config argument to a file path. A bare name maps to
    /// `/etc/openledger/<name>.toml`; anything containing `/` or `.`
    /// is used as a path directly.
    pub fn resolve_path(arg: &str) -> PathBuf {
        if arg.contains('/') || arg.contains('.') {
            PathBuf::from(arg)
        } else {
            PathBuf::from(format!("/etc/openledger/{}.toml", arg))
        }
    }

    /// Load configuration from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Verify the configuration is ready for use.
    pub fn verify(&self) -> anyhow::Result<()> {
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("Storage data_dir is empty in configuration.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/openledger/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("/srv/ledger/config.toml"),
            PathBuf::from("/srv/ledger/config.toml")
        );
    }

    #[test]
    fn test_load_and_verify() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\ndata_dir = \"/var/lib/openledger\"").unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/openledger");
        assert!(config.verify().is_ok());
    }

    #[test]
    fn test_verify_empty_data_dir() {
        let config = ServerConfig {
            storage: StorageConfig {
                data_dir: String::new(),
            },
        };
        assert!(config.verify().is_err());
    }
}
