use thiserror::Error;

/// Failures surfaced by the session authority.
///
/// Everything except [`Error::Signing`] is a caller problem and maps to a
/// client-facing status. `Signing` means the key or encoder is broken and is
/// not worth retrying.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("user already has an active session")]
    SessionAlreadyActive,
    #[error("no token provided")]
    MissingToken,
    #[error("invalid token")]
    MalformedToken,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token claims")]
    InvalidClaims,
    #[error("session is no longer active")]
    InactiveSession,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl Error {
    /// True for errors that should be reported as `401 Unauthorized`.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::MalformedToken
                | Self::TokenExpired
                | Self::InvalidClaims
                | Self::InactiveSession
        )
    }
}
