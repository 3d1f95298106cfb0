//! Protected self-service endpoints.
//!
//! Both handlers resolve the caller through [`require_session`] first, so a
//! token that was logged out or replaced never reaches the store.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use super::{error_response, normalize_username, principal::require_session, ErrorResponse};
use crate::{
    session::SessionAuthority,
    store::{CredentialStore, UserId, UserRecord},
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    #[schema(value_type = i64)]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRecord> for ProfileResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(ToSchema, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    pub username: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    responses(
        (status = 200, description = "Return the authenticated user profile", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or inactive session token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
#[instrument(skip_all)]
pub async fn get_profile(
    headers: HeaderMap,
    authority: Extension<Arc<SessionAuthority>>,
    store: Extension<Arc<dyn CredentialStore>>,
) -> Response {
    let principal = match require_session(&headers, &authority) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match store.find_by_id(principal.user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(ProfileResponse::from(user))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => {
            error!("Failed to fetch profile: {err:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/user/update",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or inactive session token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "user"
)]
#[instrument(skip_all)]
pub async fn update_profile(
    headers: HeaderMap,
    authority: Extension<Arc<SessionAuthority>>,
    store: Extension<Arc<dyn CredentialStore>>,
    payload: Option<Json<ProfileUpdateRequest>>,
) -> Response {
    let principal = match require_session(&headers, &authority) {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    };
    let Some(username) = normalize_username(&request.username) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Username is required and must be at most 50 characters",
        );
    };

    match store.update_username(principal.user_id, username).await {
        Ok(true) => info!(user_id = principal.user_id, "Updated profile"),
        Ok(false) => return error_response(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => {
            error!("Failed to update profile: {err:#}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    }

    match store.find_by_id(principal.user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(ProfileResponse::from(user))).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => {
            error!("Failed to reload profile: {err:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
