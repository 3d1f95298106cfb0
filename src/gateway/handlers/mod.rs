//! HTTP handlers and the input checks they share.

pub mod health;
pub mod login;
pub mod logout;
pub mod principal;
pub mod profile;
pub mod register;
pub mod root;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;

/// Body of every non-2xx JSON response.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            redirect: None,
        }
    }
}

/// `{status, message}` for simple acknowledgements.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Email format and length check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    if email_normalized.chars().count() > MAX_EMAIL_LEN {
        return false;
    }
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .is_ok_and(|regex| regex.is_match(email_normalized))
}

pub(crate) fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Trimmed username if it is non-empty and fits the column.
pub(crate) fn normalize_username(username: &str) -> Option<&str> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    (len > 0 && len <= MAX_USERNAME_LEN).then_some(trimmed)
}
