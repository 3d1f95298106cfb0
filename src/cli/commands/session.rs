use anyhow::{bail, Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::warn;

use crate::session::DEFAULT_SESSION_TTL;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL: &str = "session-ttl";

/// HMAC keys shorter than the SHA-256 block output are accepted but logged.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session tokens (HMAC-SHA256)")
                .env("GATEHOUSE_SESSION_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long(ARG_SESSION_TTL)
                .help(format!(
                    "Session token lifetime in seconds [default: {}]",
                    DEFAULT_SESSION_TTL.as_secs()
                ))
                .env("GATEHOUSE_SESSION_TTL")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub secret: SecretString,
    pub ttl: Duration,
}

impl Options {
    /// # Errors
    /// Returns an error if the secret is missing or empty.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .cloned()
            .context("missing required argument: --session-secret")?;
        if secret.is_empty() {
            bail!("--session-secret must not be empty");
        }

        let ttl = matches
            .get_one::<u64>(ARG_SESSION_TTL)
            .copied()
            .map_or(DEFAULT_SESSION_TTL, Duration::from_secs);

        let secret = SecretString::from(secret);
        if secret.expose_secret().len() < RECOMMENDED_SECRET_LEN {
            warn!(
                "Session secret is shorter than {} bytes; use a longer random value",
                RECOMMENDED_SECRET_LEN
            );
        }

        Ok(Self {
            secret,
            ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn defaults_and_env() {
        temp_env::with_vars(
            [
                ("GATEHOUSE_SESSION_SECRET", Some("from-env-secret")),
                ("GATEHOUSE_SESSION_TTL", None::<&str>),
            ],
            || {
                let matches = command().get_matches_from(["test"]);
                let options = Options::parse(&matches);
                assert!(options.is_ok());
                if let Ok(options) = options {
                    assert_eq!(options.secret.expose_secret(), "from-env-secret");
                    assert_eq!(options.ttl, DEFAULT_SESSION_TTL);
                }
            },
        );
    }

    #[test]
    fn ttl_must_be_positive() {
        temp_env::with_vars([("GATEHOUSE_SESSION_TTL", None::<&str>)], || {
            let result = command().try_get_matches_from([
                "test",
                "--session-secret",
                "s",
                "--session-ttl",
                "0",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn empty_secret_is_rejected() {
        temp_env::with_vars([("GATEHOUSE_SESSION_SECRET", None::<&str>)], || {
            let matches = command().get_matches_from(["test", "--session-secret", ""]);
            let result = Options::parse(&matches);
            assert!(result.is_err());
        });
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        temp_env::with_vars([("GATEHOUSE_SESSION_SECRET", None::<&str>)], || {
            let matches =
                command().get_matches_from(["test", "--session-secret", "hunter2-hunter2"]);
            let options = Options::parse(&matches);
            assert!(options.is_ok());
            if let Ok(options) = options {
                assert!(!format!("{options:?}").contains("hunter2"));
            }
        });
    }
}
