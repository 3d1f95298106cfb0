use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use super::{
    error_response, normalize_email, normalize_username, principal::reject_if_authenticated,
    valid_email, valid_password, ErrorResponse,
};
use crate::{
    password,
    session::SessionAuthority,
    store::{CredentialStore, InsertOutcome, UserId},
};

#[derive(ToSchema, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub status: String,
    pub message: String,
    #[schema(value_type = i64)]
    pub user_id: UserId,
}

#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses (
        (status = 201, description = "Registration successful", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered or caller already authenticated", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    headers: HeaderMap,
    authority: Extension<Arc<SessionAuthority>>,
    store: Extension<Arc<dyn CredentialStore>>,
    payload: Option<Json<RegisterRequest>>,
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
    if !valid_password(&request.password) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters",
        );
    }
    let Some(username) = normalize_username(&request.username) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Username is required and must be at most 50 characters",
        );
    };

    let password = request.password;
    let hash = match tokio::task::spawn_blocking(move || password::hash_password(&password)).await {
        Ok(Ok(hash)) => hash,
        Ok(Err(err)) => {
            error!("Failed to hash password: {err:#}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
        Err(err) => {
            error!("Password hashing task failed: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    match store.insert(username, &email, &hash).await {
        Ok(InsertOutcome::Created(user_id)) => {
            info!(user_id, "Registered user");
            let body = RegisterResponse {
                status: "success".to_string(),
                message: "Registration successful".to_string(),
                user_id,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Ok(InsertOutcome::Conflict) => error_response(StatusCode::CONFLICT, "User already exists"),
        Err(err) => {
            error!("Failed to register user: {err:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to register user")
        }
    }
}
