//! Token session lifecycle.
//!
//! A [`SessionAuthority`] signs `HS256` tokens and keeps at most one live
//! token per user in a [`SessionRegistry`]. Logging out removes the
//! registry entry; a token whose entry is gone or replaced still verifies
//! cryptographically but is no longer accepted by protected routes.

mod authority;
pub mod clock;
mod error;
mod registry;
mod token;

pub use authority::{SessionAuthority, DEFAULT_SESSION_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::Error;
pub use registry::SessionRegistry;
pub use token::{Claims, ALGORITHM};
