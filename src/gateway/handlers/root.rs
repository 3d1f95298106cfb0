use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Welcome {
    pub message: String,
    pub documentation: String,
    pub version: String,
}

pub async fn root() -> impl IntoResponse {
    Json(Welcome {
        message: format!("Welcome to {}", env!("CARGO_PKG_NAME")),
        documentation: "/api/docs/openapi.json".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
