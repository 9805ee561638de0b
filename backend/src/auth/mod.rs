//! Authentication for the voter API.
//!
//! Clients log in with email and password and receive a signed JWT. Every protected
//! handler takes an [`AuthenticatedUser`] (any role) or a [`SuperAdmin`] extractor;
//! both verify the bearer token and confirm the account still exists before the
//! handler body runs.

mod extractor;
pub mod password;
pub mod token;

pub use extractor::{AuthenticatedUser, SuperAdmin};
