use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{
    clock::{Clock, SystemClock},
    error::Error,
    registry::SessionRegistry,
    token::{Claims, TokenSigner},
};
use crate::store::UserId;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Issues, validates and revokes session tokens.
///
/// A token is only as good as its registry entry: [`Self::validate`] checks
/// signature and expiry, [`Self::is_currently_active`] checks that the token
/// is still the one recorded for its subject, and [`Self::authorize`] does
/// both.
pub struct SessionAuthority {
    signer: TokenSigner,
    registry: SessionRegistry,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("signer", &self.signer)
            .field("tracked_sessions", &self.registry.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionAuthority {
    /// # Errors
    /// Returns [`Error::Signing`] if the secret is empty.
    pub fn new(secret: &SecretString, registry: SessionRegistry) -> Result<Self, Error> {
        Ok(Self {
            signer: TokenSigner::new(secret.expose_secret().as_bytes())?,
            registry,
            ttl: DEFAULT_SESSION_TTL,
            clock: Arc::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Sessions whose recorded token has not expired yet.
    ///
    /// Expired entries stay in the registry until the subject logs out or
    /// logs in again; they are not counted here.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        let now = self.clock.now_unix();
        self.registry.count_where(|token| self.is_live(token, now))
    }

    /// Issue a token for an already authenticated subject.
    ///
    /// # Errors
    /// [`Error::SessionAlreadyActive`] if the subject still holds an unexpired
    /// token, [`Error::Signing`] if the token cannot be encoded.
    #[instrument(skip(self))]
    pub fn issue(&self, subject: UserId) -> Result<String, Error> {
        let now = self.clock.now_unix();
        let claims = Claims::new(subject, now, self.ttl_seconds());
        let token = self.signer.sign(&claims).map_err(|err| {
            error!("Failed to sign session token: {err}");
            err
        })?;

        let claimed = self
            .registry
            .claim(subject, token.clone(), |existing| self.is_live(existing, now));
        if !claimed {
            debug!("Subject already has an active session");
            return Err(Error::SessionAlreadyActive);
        }

        info!(expires_at = claims.expires_at, "Issued session token");
        Ok(token)
    }

    /// Check signature, algorithm, claims and expiry.
    ///
    /// Does not consult the registry.
    ///
    /// # Errors
    /// `MissingToken`, `MalformedToken`, `InvalidClaims` or `TokenExpired`.
    pub fn validate(&self, token: &str) -> Result<Claims, Error> {
        let claims = self.signer.verify(token)?;
        if claims.is_expired_at(self.clock.now_unix()) {
            return Err(Error::TokenExpired);
        }
        Ok(claims)
    }

    /// True only if `token` verifies and is the token recorded for its subject.
    /// Expiry is ignored.
    #[must_use]
    pub fn is_currently_active(&self, token: &str) -> bool {
        let Ok(claims) = self.signer.verify(token) else {
            return false;
        };
        self.registry
            .get(claims.subject)
            .is_some_and(|stored| stored == token)
    }

    /// [`Self::validate`] plus the registry check; what protected routes use.
    ///
    /// # Errors
    /// Any `validate` error, or [`Error::InactiveSession`] for a token that was
    /// logged out or replaced.
    pub fn authorize(&self, token: &str) -> Result<Claims, Error> {
        let claims = self.validate(token)?;
        if !self.is_currently_active(token) {
            return Err(Error::InactiveSession);
        }
        Ok(claims)
    }

    /// Drop the subject's session. Expired tokens are accepted, and a missing
    /// registry entry is not an error.
    ///
    /// # Errors
    /// `MissingToken`, `MalformedToken` or `InvalidClaims`.
    #[instrument(skip_all)]
    pub fn invalidate(&self, token: &str) -> Result<(), Error> {
        let claims = self.signer.verify(token)?;
        match self.registry.remove(claims.subject) {
            Some(_) => info!(subject = claims.subject, "Invalidated session"),
            None => debug!(subject = claims.subject, "No active session to invalidate"),
        }
        Ok(())
    }

    fn is_live(&self, token: &str, now_unix: i64) -> bool {
        self.signer
            .verify(token)
            .is_ok_and(|claims| !claims.is_expired_at(now_unix))
    }

    fn ttl_seconds(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}
