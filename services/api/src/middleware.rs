//! Caller identification from bearer tokens and the authorization policies
//! applied by the handlers

use anyhow::Context;
use axum::{
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::Settings, error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub userid: Uuid,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub trusted_member: bool,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub admin: bool,
    pub trusted_member: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.userid,
            admin: claims.admin,
            trusted_member: claims.trusted_member,
        }
    }
}

/// Whoever sent the request; `None` for anonymous callers
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<AuthUser>);

impl Caller {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.id)
    }

    /// Any authenticated user
    pub fn require_user(&self) -> Result<&AuthUser, ApiError> {
        self.0.as_ref().ok_or(ApiError::Unauthorized)
    }

    /// Trusted members and admins
    pub fn require_trusted(&self) -> Result<&AuthUser, ApiError> {
        let user = self.require_user()?;
        if user.trusted_member || user.admin {
            Ok(user)
        } else {
            Err(ApiError::Forbidden)
        }
    }

    pub fn require_admin(&self) -> Result<&AuthUser, ApiError> {
        let user = self.require_user()?;
        if user.admin {
            Ok(user)
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Verifies bearer tokens against the identity provider's public key
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(key: DecodingKey, validation: Validation) -> Self {
        Self { key, validation }
    }

    /// RS256 verifier built from the service settings
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let pem = settings
            .jwt_public_key_pem()
            .context("Failed to read JWT public key")?;
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .context("Failed to create JWT decoding key")?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        if let Some(issuer) = &settings.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }
        match &settings.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self::new(key, validation))
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| {
                warn!("Failed to validate token: {}", e);
                ApiError::Unauthorized
            })?;

        Ok(token_data.claims.into())
    }
}

/// Resolve the caller and store it in the request extensions.
///
/// Requests without an `Authorization` header continue anonymously; a header
/// that is not a valid bearer token is rejected.
pub async fn identify_caller(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = match bearer {
        Some(TypedHeader(Authorization(bearer))) => {
            let user = state.jwt.verify(bearer.token())?;
            debug!("Request from user {}", user.id);
            Caller(Some(user))
        }
        None if req.headers().contains_key(AUTHORIZATION) => {
            warn!("Rejecting malformed Authorization header");
            return Err(ApiError::Unauthorized);
        }
        None => Caller(None),
    };

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
