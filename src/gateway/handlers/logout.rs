use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    error_response,
    principal::{extract_bearer_token, session_error_response},
    ErrorResponse, MessageResponse,
};
use crate::session::SessionAuthority;

#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses (
        (status = 200, description = "Session cleared", body = MessageResponse),
        (status = 400, description = "No token provided", body = ErrorResponse),
        (status = 401, description = "Token could not be verified", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, authority: Extension<Arc<SessionAuthority>>) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        debug!("Logout without bearer token");
        return error_response(StatusCode::BAD_REQUEST, "No token provided");
    };

    match authority.invalidate(&token) {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::success("Successfully logged out")),
        )
            .into_response(),
        Err(err) => session_error_response(&err),
    }
}
