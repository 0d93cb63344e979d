use serde::Serialize;
use serde_json::Value;
use sicopa_docstore::DocumentSnapshot;

/// Collection holding one document per inventoried asset, keyed by `id_bien`.
pub const COLLECTION: &str = "bienes";

/// Field names of an asset document.
pub mod field {
    pub const ID: &str = "id_bien";
    pub const NAME: &str = "nombre_bien";
    pub const AREA: &str = "ubicacion_actual.area";
    pub const STATUS: &str = "estatus_verificacion";
    pub const SERIAL: &str = "serie";
    /// Server-assigned on every bulk write.
    pub const UPDATED_AT: &str = "ultima_actualizacion";
}

pub const DEFAULT_DESCRIPTION: &str = "Sin descripción";
pub const DEFAULT_STATUS: &str = "PENDIENTE";
pub const DEFAULT_SERIAL: &str = "N/A";

/// The slice of an asset shown in the inventory report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub descripcion: String,
    pub estatus: String,
    pub serie: String,
}

impl ReportRow {
    /// Project a stored asset, substituting defaults for absent fields.
    pub fn project(snapshot: &DocumentSnapshot) -> Self {
        let text = |name: &str| display_text(snapshot.data.get(name));
        Self {
            id: text(field::ID).unwrap_or_else(|| snapshot.id.clone()),
            descripcion: text(field::NAME).unwrap_or_else(|| DEFAULT_DESCRIPTION.into()),
            estatus: text(field::STATUS).unwrap_or_else(|| DEFAULT_STATUS.into()),
            serie: text(field::SERIAL).unwrap_or_else(|| DEFAULT_SERIAL.into()),
        }
    }
}

/// Printable form of a field, or `None` when the field counts as absent:
/// missing, null, `false`, `0` or the empty string.
fn display_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(number_text(n)),
        other => Some(other.to_string()),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Document id for an incoming record's `id_bien`: non-empty strings are used
/// as-is and numbers by their decimal text. Anything else has no id.
pub fn document_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}
