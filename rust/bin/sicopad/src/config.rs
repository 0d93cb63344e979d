//! Server configuration file (`/etc/sicopa/<context>.toml`).
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/sicopa"
//! seed_dir = "/etc/sicopa/seed"      # optional
//!
//! [jwt]
//! secret = "..."
//! issuer = "https://auth.example"    # optional
//! audience = "sicopa"                # optional
//!
//! [bootstrap]
//! admin_uids = ["uid-1"]
//!
//! [inventory]
//! batch_size = 500
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use sicopa_inventory::InventoryConfig;

/// Directory holding named contexts.
pub const CONFIG_DIR: &str = "/etc/sicopa";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Read-only seed documents. Defaults to `{data_dir}/seed`.
    #[serde(default)]
    pub seed_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 shared secret.
    pub secret: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// Users granted the privileged role at startup.
    #[serde(default)]
    pub admin_uids: Vec<String>,
}

impl ServerConfig {
    /// A bare context name maps to `/etc/sicopa/<name>.toml`; anything with
    /// `/` or `.` is taken as a path.
    pub fn resolve_path(context: &str) -> PathBuf {
        if context.contains('/') || context.contains('.') {
            PathBuf::from(context)
        } else {
            Path::new(CONFIG_DIR).join(format!("{}.toml", context))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_context_name() {
        assert_eq!(
            ServerConfig::resolve_path("produccion"),
            PathBuf::from("/etc/sicopa/produccion.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("/srv/sicopa.toml"),
            PathBuf::from("/srv/sicopa.toml")
        );
    }

    #[test]
    fn parse_minimal() {
        let config = ServerConfig::parse(
            r#"
            [storage]
            data_dir = "/var/lib/sicopa"

            [jwt]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/sicopa");
        assert!(config.storage.seed_dir.is_none());
        assert!(config.bootstrap.admin_uids.is_empty());
        assert_eq!(config.inventory, InventoryConfig::default());
    }

    #[test]
    fn parse_full() {
        let config = ServerConfig::parse(
            r#"
            [storage]
            data_dir = "/data"
            seed_dir = "/etc/sicopa/seed"

            [jwt]
            secret = "s3cret"
            issuer = "https://auth.edomex.example"
            audience = "sicopa"

            [bootstrap]
            admin_uids = ["u-1", "u-2"]

            [inventory]
            privileged_role = "ADMIN_SUPREMO"
            batch_size = 250

            [inventory.report]
            system_label = "SICOPA"
            "#,
        )
        .unwrap();
        assert_eq!(config.jwt.audience.as_deref(), Some("sicopa"));
        assert_eq!(config.bootstrap.admin_uids, vec!["u-1", "u-2"]);
        assert_eq!(config.inventory.batch_size, 250);
        assert_eq!(config.inventory.report.system_label, "SICOPA");
        assert_eq!(
            config.inventory.report.institution_label,
            "GOBIERNO DEL ESTADO DE MÉXICO"
        );
    }

    #[test]
    fn missing_jwt_section_is_an_error() {
        assert!(ServerConfig::parse("[storage]\ndata_dir = \"/d\"\n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
