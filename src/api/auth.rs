//! Sign-in, institution registration and session lookups.

use super::client::{ApiClient, ApiError};
use super::types::{AuthRequest, AuthResponse, CreateInstitutionRequest, Institution, User};

/// Register a new institution with its first account.
///
/// POST auth/register
pub async fn post_institution(
    client: &ApiClient,
    request: &CreateInstitutionRequest,
) -> Result<Institution, ApiError> {
    client.post("auth/register", request).await
}

/// Exchange credentials for a JWT.
///
/// POST auth
pub async fn post_authentication(
    client: &ApiClient,
    request: &AuthRequest,
) -> Result<AuthResponse, ApiError> {
    client.post("auth", request).await
}

/// Institution the bearer token belongs to.
///
/// GET auth/institution
pub async fn get_authenticated_institution(client: &ApiClient) -> Result<Institution, ApiError> {
    client.get("auth/institution").await
}

/// User the bearer token belongs to.
///
/// GET auth/user
pub async fn get_current_user(client: &ApiClient) -> Result<User, ApiError> {
    client.get("auth/user").await
}
