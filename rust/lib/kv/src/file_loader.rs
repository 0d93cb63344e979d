use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::KVError;

/// FileLoader scans a seed directory and produces the read-only file layer of
/// an `OverlayKV`. The directory structure determines the key namespace:
///
/// ```text
/// seed-dir/
/// ├── usuarios/admin-01.yaml   → usuarios/admin-01
/// ├── usuarios/auditor.yml     → usuarios/auditor
/// └── bienes/MX-0001.yaml      → bienes/MX-0001
/// ```
///
/// Each YAML file is converted to JSON so that seeded entries and
/// DB-written entries share one encoding.
pub struct FileLoader;

impl FileLoader {
    /// Load every `<collection>/<id>.yaml` under `seed_dir`.
    pub fn load(seed_dir: &Path) -> Result<BTreeMap<String, Vec<u8>>, KVError> {
        let mut layer = BTreeMap::new();

        if !seed_dir.is_dir() {
            debug!("FileLoader: seed dir {:?} does not exist, skipping", seed_dir);
            return Ok(layer);
        }

        for entry in fs::read_dir(seed_dir).map_err(|e| KVError::Storage(e.to_string()))? {
            let path = entry.map_err(|e| KVError::Storage(e.to_string()))?.path();
            if !path.is_dir() {
                if Self::is_yaml(&path) {
                    warn!("FileLoader: {:?} is outside a collection directory, skipping", path);
                }
                continue;
            }
            let Some(collection) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            Self::load_collection(&path, collection, &mut layer)?;
        }

        debug!("FileLoader: loaded {} entries from {:?}", layer.len(), seed_dir);
        Ok(layer)
    }

    fn load_collection(
        dir: &Path,
        collection: &str,
        layer: &mut BTreeMap<String, Vec<u8>>,
    ) -> Result<(), KVError> {
        for entry in fs::read_dir(dir).map_err(|e| KVError::Storage(e.to_string()))? {
            let path = entry.map_err(|e| KVError::Storage(e.to_string()))?.path();
            if !path.is_file() || !Self::is_yaml(&path) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let seed_err = |message: String| KVError::Seed {
                path: path.display().to_string(),
                message,
            };
            let raw = fs::read(&path).map_err(|e| seed_err(e.to_string()))?;
            let doc: serde_json::Value =
                serde_yaml::from_slice(&raw).map_err(|e| seed_err(e.to_string()))?;
            if !doc.is_object() {
                return Err(seed_err("top level must be a mapping".into()));
            }
            let json = serde_json::to_vec(&doc).map_err(|e| seed_err(e.to_string()))?;

            layer.insert(format!("{}/{}", collection, id), json);
        }
        Ok(())
    }

    fn is_yaml(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        )
    }
}
