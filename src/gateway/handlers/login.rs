use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use super::{
    error_response, normalize_email,
    principal::{reject_if_authenticated, session_error_response},
    valid_email, ErrorResponse,
};
use crate::{
    password,
    session::SessionAuthority,
    store::{CredentialStore, UserId},
};

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginUser {
    #[schema(value_type = i64)]
    pub id: UserId,
    pub username: String,
    pub is_authenticated: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub status: String,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub user: LoginUser,
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "User already has an active session", body = ErrorResponse),
        (status = 409, description = "Caller already authenticated", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    headers: HeaderMap,
    authority: Extension<Arc<SessionAuthority>>,
    store: Extension<Arc<dyn CredentialStore>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    if let Some(response) = reject_if_authenticated(&headers, &authority) {
        return response;
    }

    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid email format");
    }

    let user = match store.find_by_email(&email).await {
        Ok(user) => user,
        Err(err) => {
            error!("Failed to lookup user: {err:#}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let password = request.password;
    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => password::verify_password(&hash, &password),
        None => {
            password::verify_dummy(&password);
            false
        }
    })
    .await;

    let user = match (verified, user) {
        (Ok(true), Some(user)) => user,
        (Ok(_), _) => {
            debug!("Invalid credentials");
            return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        (Err(err), _) => {
            error!("Password verification task failed: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let token = match authority.issue(user.id) {
        Ok(token) => token,
        Err(err) => return session_error_response(&err),
    };

    info!(user_id = user.id, "User logged in");
    let body = LoginResponse {
        status: "success".to_string(),
        token,
        expires_in: authority.ttl().as_secs(),
        user: LoginUser {
            id: user.id,
            username: user.username,
            is_authenticated: true,
        },
    };
    (StatusCode::OK, Json(body)).into_response()
}
