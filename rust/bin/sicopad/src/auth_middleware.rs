//! JWT bearer authentication.
//!
//! Validates `Authorization: Bearer <token>` (HS256) and turns the `sub`
//! claim into the request principal. Requests without a token pass through
//! anonymously; the callable operations decide whether that is fatal.

use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sicopa_core::{bearer_token, Authenticator, Principal, ServiceError};
use tracing::debug;

use crate::config::JwtConfig;

/// Claims read from an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user uid, keys `usuarios/<uid>`.
    pub sub: String,
    /// Expiration (unix timestamp). Checked by `Validation`.
    pub exp: i64,
}

pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Principal>, ServiceError> {
        let Some(token) = bearer_token(headers) else {
            return Ok(None);
        };
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("rejected bearer token: {}", e);
                ServiceError::Unauthenticated(format!("Token inválido: {}", e))
            })?;
        if data.claims.sub.is_empty() {
            return Err(ServiceError::Unauthenticated("Token sin sujeto.".into()));
        }
        Ok(Some(Principal::new(data.claims.sub)))
    }
}
