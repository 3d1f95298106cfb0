//! Bearer-token principal extraction.
//!
//! Protected handlers call [`require_session`]; it accepts a token only if the
//! signature and expiry check out AND it is still the subject's registered
//! session.

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, error};

use super::{error_response, ErrorResponse};
use crate::session::{Claims, Error, SessionAuthority};
use crate::store::UserId;

/// Authenticated caller derived from the bearer token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: UserId,
    pub claims: Claims,
}

/// Resolve the bearer token into a principal, or the error response to send.
pub fn require_session(
    headers: &HeaderMap,
    authority: &SessionAuthority,
) -> Result<Principal, Response> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(session_error_response(&Error::MissingToken));
    };

    match authority.authorize(&token) {
        Ok(claims) => Ok(Principal {
            user_id: claims.subject,
            claims,
        }),
        Err(err) => {
            debug!("Rejected bearer token: {err}");
            Err(session_error_response(&err))
        }
    }
}

/// 409 response for register/login when the caller already holds a live session.
pub(crate) fn reject_if_authenticated(
    headers: &HeaderMap,
    authority: &SessionAuthority,
) -> Option<Response> {
    let token = extract_bearer_token(headers)?;
    authority.authorize(&token).ok()?;

    let mut body = ErrorResponse::new("Already authenticated");
    body.redirect = Some("/".to_string());
    Some((StatusCode::CONFLICT, Json(body)).into_response())
}

pub(crate) fn session_error_response(err: &Error) -> Response {
    let message = match err {
        Error::SessionAlreadyActive => "User already logged in",
        Error::MissingToken => "Authorization header required",
        Error::TokenExpired => "Token expired",
        Error::InactiveSession => "Session is no longer active",
        Error::MalformedToken | Error::InvalidClaims => "Invalid token",
        Error::Signing(detail) => {
            error!("Session token signing failed: {detail}");
            "Internal server error"
        }
    };

    let status = if err.is_unauthorized() {
        StatusCode::UNAUTHORIZED
    } else if matches!(err, Error::SessionAlreadyActive) {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    error_response(status, message)
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// A bare token without the scheme is treated as absent.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extract_bearer_token_variants() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(
            extract_bearer_token(&headers_with("bearer   token ")).as_deref(),
            Some("token")
        );
        assert_eq!(extract_bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers_with("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer_token(&headers_with("abc.def.ghi")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            session_error_response(&Error::SessionAlreadyActive).status(),
            StatusCode::FORBIDDEN
        );
        for err in [
            Error::MissingToken,
            Error::MalformedToken,
            Error::TokenExpired,
            Error::InvalidClaims,
            Error::InactiveSession,
        ] {
            assert_eq!(session_error_response(&err).status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(
            session_error_response(&Error::Signing("x".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn status_follows_unauthorized_classification() {
        for err in [
            Error::SessionAlreadyActive,
            Error::MissingToken,
            Error::MalformedToken,
            Error::TokenExpired,
            Error::InvalidClaims,
            Error::InactiveSession,
            Error::Signing("x".to_string()),
        ] {
            let unauthorized = session_error_response(&err).status() == StatusCode::UNAUTHORIZED;
            assert_eq!(unauthorized, err.is_unauthorized(), "{err:?}");
        }
    }
}
