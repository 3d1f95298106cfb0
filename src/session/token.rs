//! Compact `HS256` JWS encoding for session tokens.
//!
//! Token layout is `base64url(header).base64url(claims).base64url(mac)` where
//! the MAC is HMAC-SHA256 over the first two segments.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use ulid::Ulid;

use super::error::Error;
use crate::store::UserId;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Decoded session claims.
///
/// `sub`, `iat` and `exp` are required; a token whose payload lacks any of
/// them is rejected with [`Error::InvalidClaims`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub subject: UserId,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl Claims {
    pub(crate) fn new(subject: UserId, now_unix: i64, ttl_seconds: i64) -> Self {
        Self {
            subject,
            issued_at: now_unix,
            expires_at: now_unix.saturating_add(ttl_seconds),
            token_id: Some(Ulid::new().to_string()),
        }
    }

    /// Expiry is inclusive: a token is dead at exactly `exp`.
    #[must_use]
    pub const fn is_expired_at(&self, now_unix: i64) -> bool {
        self.expires_at <= now_unix
    }
}

/// Keyed HMAC used to sign and verify tokens.
#[derive(Clone)]
pub(crate) struct TokenSigner {
    mac: HmacSha256,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("alg", &ALGORITHM)
            .field("key", &"***")
            .finish()
    }
}

impl TokenSigner {
    pub(crate) fn new(secret: &[u8]) -> Result<Self, Error> {
        if secret.is_empty() {
            return Err(Error::Signing("signing secret is empty".to_string()));
        }
        let mac =
            HmacSha256::new_from_slice(secret).map_err(|err| Error::Signing(err.to_string()))?;
        Ok(Self { mac })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, Error> {
        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(claims)?;
        Ok(self.sign_segments(&header_b64, &claims_b64))
    }

    /// Check the token shape, algorithm and MAC, then decode the claims.
    ///
    /// Expiry is not checked here; callers decide whether it matters.
    pub(crate) fn verify(&self, token: &str) -> Result<Claims, Error> {
        if token.is_empty() {
            return Err(Error::MissingToken);
        }

        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(Error::MalformedToken)?;
        let claims_b64 = parts.next().ok_or(Error::MalformedToken)?;
        let sig_b64 = parts.next().ok_or(Error::MalformedToken)?;
        if parts.next().is_some() {
            return Err(Error::MalformedToken);
        }

        let header: TokenHeader = b64d_json(header_b64).ok_or(Error::MalformedToken)?;
        if header.alg != ALGORITHM {
            return Err(Error::MalformedToken);
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::MalformedToken)?;
        let mut mac = self.mac.clone();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature).map_err(|_| Error::MalformedToken)?;

        b64d_json(claims_b64).ok_or(Error::InvalidClaims)
    }

    fn sign_segments(&self, header_b64: &str, claims_b64: &str) -> String {
        let signing_input = format!("{header_b64}.{claims_b64}");
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_b64 = Base64UrlUnpadded::encode_string(&signature);
        format!("{signing_input}.{signature_b64}")
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value).map_err(|err| Error::Signing(err.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Option<T> {
    let bytes = Base64UrlUnpadded::decode_vec(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}
