//! Inventory module settings, read from the `[inventory]` table of the
//! server configuration.

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use sicopa_docstore::MAX_BATCH_WRITES;

pub const DEFAULT_PRIVILEGED_ROLE: &str = "ADMIN_SUPREMO";
pub const DEFAULT_LOCATED_STATUS: &str = "UBICADO";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Role a user record must carry to run bulk loads.
    pub privileged_role: String,
    /// Status value rendered in the "located" color.
    pub located_status: String,
    /// Writes per committed chunk during bulk loads. Capped at 500.
    pub batch_size: usize,
    pub report: ReportConfig,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            privileged_role: DEFAULT_PRIVILEGED_ROLE.into(),
            located_status: DEFAULT_LOCATED_STATUS.into(),
            batch_size: MAX_BATCH_WRITES,
            report: ReportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub institution_label: String,
    pub system_label: String,
    /// chrono strftime pattern for the generation timestamp (local time).
    pub timestamp_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            institution_label: "GOBIERNO DEL ESTADO DE MÉXICO".into(),
            system_label: "SICOPA - SISTEMA DE CONTROL".into(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.into(),
        }
    }
}

impl InventoryConfig {
    /// Check settings that would otherwise only fail at request time.
    pub fn validate(&self) -> Result<(), String> {
        if self.privileged_role.trim().is_empty() {
            return Err("inventory.privileged_role must not be empty".into());
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_WRITES {
            return Err(format!(
                "inventory.batch_size must be between 1 and {}, got {}",
                MAX_BATCH_WRITES, self.batch_size
            ));
        }
        if !is_valid_strftime(&self.report.timestamp_format) {
            return Err(format!(
                "inventory.report.timestamp_format '{}' is not a valid strftime pattern",
                self.report.timestamp_format
            ));
        }
        Ok(())
    }

    /// Chunk size actually used for bulk loads.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_WRITES)
    }
}

pub(crate) fn is_valid_strftime(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}
