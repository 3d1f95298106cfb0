//! # Gatehouse (session authentication service)
//!
//! `gatehouse` registers users, authenticates them against stored
//! credentials, and issues bearer tokens that guard a small set of routes.
//!
//! ## Sessions
//!
//! Tokens are compact `HS256` JWS values signed with a process-wide secret.
//! Signature validity alone cannot be revoked, so every issued token is also
//! recorded in a [`session::SessionRegistry`] keyed by user id. A user holds
//! at most one live token; logging in again while that token is unexpired is
//! refused until the user logs out or the token expires.
//!
//! Protected routes accept a token only when it verifies, has not expired,
//! and is the token currently recorded for its subject.
//!
//! ## Persistence
//!
//! Users live in Postgres (see `sql/schema.sql`). Sessions live only in
//! process memory and are lost on restart.

pub mod cli;
pub mod gateway;
pub mod password;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
