//! Identifiers, redacted secrets, client credentials, and token exchange results.

pub mod credentials;
pub mod id;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use secret::*;
pub use token::*;
