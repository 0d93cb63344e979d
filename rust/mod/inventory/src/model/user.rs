use sicopa_docstore::Document;

/// Collection of user records, keyed by the principal's uid.
pub const COLLECTION: &str = "usuarios";

pub const ROLE_FIELD: &str = "rol";

/// The parts of a `usuarios/<uid>` document that authorization reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserRecord {
    pub rol: Option<String>,
}

impl UserRecord {
    /// A non-string `rol` is treated as no role at all.
    pub fn from_document(data: &Document) -> Self {
        Self {
            rol: data
                .get(ROLE_FIELD)
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.rol.as_deref() == Some(role)
    }
}
