use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use sicopa_core::{Principal, ServiceError};
use tracing::{error, info};

use super::guard::{require_principal, MSG_REPORT_UNAUTHENTICATED};
use super::{store_error, InventoryService};
use crate::model::{asset, ReportRow};
use crate::report::{build_document, report_file_name, ReportData, ReportOutcome};

/// Input of `generate-inventory-report`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub area: String,
}

impl InventoryService {
    /// Build the verification report PDF for every asset located in `area`.
    pub fn generate_report(
        &self,
        caller: Option<&Principal>,
        data: Value,
    ) -> Result<ReportOutcome, ServiceError> {
        let principal = require_principal(caller, MSG_REPORT_UNAUTHENTICATED)?;
        let request: ReportRequest = serde_json::from_value(data).map_err(|e| {
            ServiceError::InvalidArgument(format!("Se esperaba el área del reporte: {}", e))
        })?;
        let area = request.area.as_str();

        let rows = self.report_rows(area)?;
        if rows.is_empty() {
            info!(uid = %principal.uid, area, "no assets for area");
            return Ok(ReportOutcome::no_assets());
        }

        let data = ReportData {
            area,
            rows: &rows,
            generated_at: Local::now(),
        };
        let definition = build_document(&data, &self.config);
        let pdf = self.renderer.render(&definition).map_err(|e| {
            error!(area, error = %e, "PDF rendering failed");
            ServiceError::Internal(format!("Error al generar PDF: {}", e))
        })?;

        info!(
            uid = %principal.uid,
            area,
            assets = rows.len(),
            bytes = pdf.len(),
            "inventory report generated"
        );
        Ok(ReportOutcome::Generated {
            pdf_base64: STANDARD.encode(&pdf),
            file_name: report_file_name(area),
        })
    }

    /// Report rows for `area`, ordered by document id.
    pub fn report_rows(&self, area: &str) -> Result<Vec<ReportRow>, ServiceError> {
        let hits = self
            .store
            .query_eq(asset::COLLECTION, asset::field::AREA, &Value::String(area.to_string()))
            .map_err(|e| store_error("report query", e))?;
        Ok(hits.iter().map(ReportRow::project).collect())
    }
}
