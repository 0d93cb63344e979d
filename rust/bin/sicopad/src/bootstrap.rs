//! Startup: configuration checks, storage wiring, bootstrap admin records.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use sicopa_core::ServiceConfig;
use sicopa_docstore::{DocRef, Document, DocumentStore, SetOptions};
use sicopa_inventory::model::{user, UserRecord};
use sicopa_kv::{FileLoader, KVStore, OverlayKV, RedbStore};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Refuse to start on a configuration that cannot serve requests.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    config.inventory.validate().map_err(anyhow::Error::msg)?;
    for uid in &config.bootstrap.admin_uids {
        DocRef::new(user::COLLECTION, uid.as_str())
            .map_err(|e| anyhow::anyhow!("bootstrap.admin_uids entry '{}': {}", uid, e))?;
    }
    Ok(())
}

/// Storage settings derived from the server configuration.
pub fn service_config(config: &ServerConfig, listen: &str) -> ServiceConfig {
    ServiceConfig {
        data_dir: Some(PathBuf::from(&config.storage.data_dir)),
        seed_dir: config.storage.seed_dir.as_ref().map(PathBuf::from),
        listen: listen.to_string(),
        ..Default::default()
    }
}

/// Open redb under the data dir, overlaid with the read-only seed documents.
pub fn open_kv(core: &ServiceConfig) -> anyhow::Result<Arc<dyn KVStore>> {
    let db = RedbStore::open(&core.resolve_db_path())
        .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?;
    let seed_dir = core.resolve_seed_dir();
    let layer = FileLoader::load(&seed_dir)
        .map_err(|e| anyhow::anyhow!("failed to load seed documents: {}", e))?;
    let overlay = OverlayKV::new(db, layer);
    info!(
        "KV store ready ({} seed documents from {})",
        overlay.file_layer_len(),
        seed_dir.display()
    );
    Ok(Arc::new(overlay))
}

/// Create a `usuarios/<uid>` record holding the privileged role for every
/// configured admin uid that has none. Existing records are never modified.
/// Returns the number of records created.
pub fn ensure_admins(
    store: &dyn DocumentStore,
    admin_uids: &[String],
    privileged_role: &str,
) -> anyhow::Result<usize> {
    let mut batch = store.batch();
    for uid in admin_uids {
        let doc = DocRef::new(user::COLLECTION, uid.as_str())?;
        match store.get(&doc)? {
            Some(snapshot) => {
                let record = UserRecord::from_document(&snapshot.data);
                if !record.has_role(privileged_role) {
                    warn!(
                        "User {} exists with role {:?}; leaving it unchanged",
                        uid, record.rol
                    );
                }
            }
            None => {
                let mut record = Document::new();
                record.insert(user::ROLE_FIELD.into(), json!(privileged_role));
                batch.set(doc, record, SetOptions::overwrite())?;
            }
        }
    }
    if batch.is_empty() {
        return Ok(0);
    }
    let created = store.commit(batch)?;
    info!("Created {} user record(s) with role {}", created, privileged_role);
    Ok(created)
}
