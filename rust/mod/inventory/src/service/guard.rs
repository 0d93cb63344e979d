//! Caller checks shared by the callable operations.

use sicopa_core::{Principal, ServiceError};
use sicopa_docstore::DocRef;
use tracing::warn;

use super::{store_error, InventoryService};
use crate::model::{user, UserRecord};

pub const MSG_REPORT_UNAUTHENTICATED: &str = "El usuario debe estar autenticado.";
pub const MSG_UNAUTHENTICATED: &str = "No autenticado.";
pub const MSG_NOT_PRIVILEGED: &str = "Solo el Administrador Supremo puede realizar cargas masivas.";

/// Reject calls without a principal. Touches nothing else.
pub fn require_principal<'a>(
    caller: Option<&'a Principal>,
    message: &str,
) -> Result<&'a Principal, ServiceError> {
    caller.ok_or_else(|| ServiceError::Unauthenticated(message.to_string()))
}

impl InventoryService {
    /// The caller must be authenticated and its `usuarios/<uid>` record must
    /// carry the privileged role. A missing record denies access.
    pub fn require_privileged<'a>(
        &self,
        caller: Option<&'a Principal>,
    ) -> Result<&'a Principal, ServiceError> {
        let principal = require_principal(caller, MSG_UNAUTHENTICATED)?;

        // A uid that cannot name a document cannot have a user record.
        let Ok(doc) = DocRef::new(user::COLLECTION, principal.uid.as_str()) else {
            warn!(uid = %principal.uid, "uid is not a valid document id");
            return Err(ServiceError::PermissionDenied(MSG_NOT_PRIVILEGED.into()));
        };

        let record = self
            .store
            .get(&doc)
            .map_err(|e| store_error("load user record", e))?
            .map(|snapshot| UserRecord::from_document(&snapshot.data));

        match record {
            Some(user) if user.has_role(&self.config.privileged_role) => Ok(principal),
            Some(user) => {
                warn!(uid = %principal.uid, rol = ?user.rol, "privileged operation denied");
                Err(ServiceError::PermissionDenied(MSG_NOT_PRIVILEGED.into()))
            }
            None => {
                warn!(uid = %principal.uid, "privileged operation denied: no user record");
                Err(ServiceError::PermissionDenied(MSG_NOT_PRIVILEGED.into()))
            }
        }
    }
}
