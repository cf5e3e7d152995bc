//! Authentication and authorization.
//!
//! JWT bearer tokens signed with HS256. Each portal (owner, manager,
//! salesman, company, customer) logs in through the same endpoint with an
//! explicit role, and tokens carry that role so route guards can enforce it.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{company, customer, employee};
use crate::errors::ErrorResponse;

/// Portal roles. Staff roles (manager, salesman) map to employee rows;
/// owner is a configured principal with no database row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Manager,
    Salesman,
    Company,
    Customer,
}

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub branch_id: Option<Uuid>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated principal extracted from a validated token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub branch_id: Option<Uuid>,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Branch id or Forbidden; managers and salesmen must be assigned
    /// to a branch before they can act on branch-scoped resources.
    pub fn require_branch(&self) -> Result<Uuid, AuthError> {
        self.branch_id.ok_or(AuthError::NoBranchAssigned)
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub token_expiration: Duration,
    pub owner_email: String,
    pub owner_name: String,
    /// Argon2 hash; owner login is disabled when unset
    pub owner_password_hash: Option<String>,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            token_expiration: Duration::from_secs(cfg.jwt_expiration as u64),
            owner_email: cfg.owner_email.clone(),
            owner_name: cfg.owner_name.clone(),
            owner_password_hash: cfg.owner_password_hash.clone(),
        }
    }
}

/// Handles credential checks, token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
}

/// A principal that passed credential checks and may receive a token
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub branch_id: Option<Uuid>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Check credentials for the given portal role.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Principal, AuthError> {
        match role {
            Role::Owner => self.authenticate_owner(email, password),
            Role::Manager | Role::Salesman => self.authenticate_staff(email, password, role).await,
            Role::Company => self.authenticate_company(email, password).await,
            Role::Customer => self.authenticate_customer(email, password).await,
        }
    }

    fn authenticate_owner(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let hash = self
            .config
            .owner_password_hash
            .as_deref()
            .ok_or_else(|| {
                warn!("Owner login attempted but no owner password hash is configured");
                AuthError::InvalidCredentials
            })?;

        if !email.eq_ignore_ascii_case(&self.config.owner_email)
            || !verify_password(password, hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal {
            id: Uuid::nil(),
            name: self.config.owner_name.clone(),
            role: Role::Owner,
            branch_id: None,
        })
    }

    async fn authenticate_staff(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Principal, AuthError> {
        let record = employee::Entity::find()
            .filter(employee::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        // Role is chosen at login; a salesman cannot enter the manager portal
        if record.role != role.to_string() {
            return Err(AuthError::InvalidCredentials);
        }

        if !verify_password(password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        // Resigned or fired staff keep their row but lose access
        if !record.is_active() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(Principal {
            id: record.id,
            name: record.name,
            role,
            branch_id: record.branch_id,
        })
    }

    async fn authenticate_company(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let record = company::Entity::find()
            .filter(company::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal {
            id: record.id,
            name: record.name,
            role: Role::Company,
            branch_id: None,
        })
    }

    async fn authenticate_customer(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let record = customer::Entity::find()
            .filter(customer::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &record.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal {
            id: record.id,
            name: record.name,
            role: Role::Customer,
            branch_id: None,
        })
    }

    /// Generate a JWT token for an authenticated principal
    pub fn generate_token(&self, principal: &Principal) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: principal.id.to_string(),
            name: principal.name.clone(),
            role: principal.role,
            branch_id: principal.branch_id,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_expiration.as_secs() as i64,
            role: principal.role,
            name: principal.name.clone(),
            branch_id: principal.branch_id,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.jwt_audience]);
        validation.set_issuer(&[&self.config.jwt_issuer]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }
}

/// Hash a password with Argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::InternalError(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient role")]
    InsufficientRole,

    #[error("No branch assigned")]
    NoBranchAssigned,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth
            | Self::InvalidCredentials
            | Self::InvalidToken
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::AccountDisabled | Self::InsufficientRole | Self::NoBranchAssigned => {
                StatusCode::FORBIDDEN
            }
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn response_message(&self) -> String {
        match self {
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<AuthError> for crate::errors::ServiceError {
    fn from(err: AuthError) -> Self {
        match err.status_code() {
            StatusCode::UNAUTHORIZED => crate::errors::ServiceError::Unauthorized(err.to_string()),
            StatusCode::FORBIDDEN => crate::errors::ServiceError::Forbidden(err.to_string()),
            _ => crate::errors::ServiceError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            success: false,
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            request_id: crate::request_id::current_request_id().map(|r| r.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}

/// Role middleware to check the authenticated user's role
pub async fn role_middleware(
    State(required_role): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_role(required_role) {
        debug!(
            user_role = %user.role,
            required = %required_role,
            "Rejecting request with insufficient role"
        );
        return Err(AuthError::InsufficientRole);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::MissingAuth);
    }

    let token = auth_header.trim_start_matches("Bearer ").trim();
    let claims = auth_service.validate_token(token)?;
    let user_id = Uuid::from_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

    Ok(AuthUser {
        user_id,
        name: claims.name,
        role: claims.role,
        branch_id: claims.branch_id,
        token_id: claims.jti,
    })
}

/// Login request body
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub role: Role,
}

/// Successful login payload
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
    pub name: String,
    pub branch_id: Option<Uuid>,
}

/// Authentication routes
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new().route("/login", axum::routing::post(login_handler))
}

pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    credentials
        .validate()
        .map_err(|_| AuthError::InvalidCredentials)?;

    let principal = auth_service
        .authenticate(&credentials.email, &credentials.password, credentials.role)
        .await?;

    let token = auth_service.generate_token(&principal)?;
    Ok(Json(token))
}

/// Extension methods for Router to add auth middleware
pub trait RoleRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: Role) -> Self;
}

impl<S> RoleRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: Role) -> Self {
        self.layer(axum::middleware::from_fn_with_state(role, role_middleware))
            .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        let config = AuthConfig {
            jwt_secret: "test_secret_that_is_at_least_32_chars_long!".to_string(),
            jwt_audience: "storechain-api".to_string(),
            jwt_issuer: "storechain-auth".to_string(),
            token_expiration: Duration::from_secs(3600),
            owner_email: "owner@storechain.local".to_string(),
            owner_name: "Owner".to_string(),
            owner_password_hash: None,
        };
        // Credential tests that need the DB live in the integration suite
        let db = Arc::new(DatabaseConnection::Disconnected);
        AuthService::new(config, db)
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let service = test_service();
        let principal = Principal {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            role: Role::Manager,
            branch_id: Some(Uuid::new_v4()),
        };

        let token = service.generate_token(&principal).unwrap();
        let claims = service.validate_token(&token.access_token).unwrap();

        assert_eq!(claims.sub, principal.id.to_string());
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.branch_id, principal.branch_id);
        assert_eq!(claims.name, "Alice");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let principal = Principal {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            role: Role::Salesman,
            branch_id: None,
        };

        let token = service.generate_token(&principal).unwrap();
        let mut tampered = token.access_token.clone();
        tampered.push('x');
        assert!(matches!(
            service.validate_token(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn owner_login_disabled_without_hash() {
        let service = test_service();
        let result = service.authenticate_owner("owner@storechain.local", "anything");
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn owner_login_checks_email_and_password() {
        let mut service = test_service();
        service.config.owner_password_hash = Some(hash_password("owner-pass").unwrap());

        let ok = service
            .authenticate_owner("owner@storechain.local", "owner-pass")
            .unwrap();
        assert_eq!(ok.role, Role::Owner);
        assert_eq!(ok.id, Uuid::nil());

        assert!(service
            .authenticate_owner("someone@else.com", "owner-pass")
            .is_err());
        assert!(service
            .authenticate_owner("owner@storechain.local", "wrong")
            .is_err());
    }

    #[test]
    fn role_string_forms() {
        assert_eq!(Role::Salesman.to_string(), "salesman");
        assert_eq!(Role::from_str("company").unwrap(), Role::Company);
        assert!(Role::from_str("superuser").is_err());
    }
}
