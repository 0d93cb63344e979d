//! Inventory verification report: layout, PDF rendering and the payload
//! returned to callers.

pub mod builder;
pub mod layout;
pub mod metrics;
pub mod render;

use serde::Serialize;

pub use builder::{build_document, ReportData};
pub use layout::DocumentDefinition;
pub use render::{LopdfRenderer, PdfRenderer, RenderError};

/// Payload returned when the area has no assets.
pub const NO_ASSETS_MESSAGE: &str = "No se encontraron bienes para esta área.";

/// Result of a report request. An area without assets is a normal outcome,
/// not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportOutcome {
    Generated {
        #[serde(rename = "pdfBase64")]
        pdf_base64: String,
        #[serde(rename = "fileName")]
        file_name: String,
    },
    NoAssets {
        error: String,
    },
}

impl ReportOutcome {
    pub fn no_assets() -> Self {
        ReportOutcome::NoAssets {
            error: NO_ASSETS_MESSAGE.to_string(),
        }
    }
}

/// `Reporte_<area>.pdf`, each run of whitespace in the area collapsed to `_`.
pub fn report_file_name(area: &str) -> String {
    let mut name = String::from("Reporte_");
    let mut in_whitespace = false;
    for c in area.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                name.push('_');
            }
            in_whitespace = true;
        } else {
            name.push(c);
            in_whitespace = false;
        }
    }
    name.push_str(".pdf");
    name
}
