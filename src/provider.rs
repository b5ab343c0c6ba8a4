//! Provider-facing descriptors: per-provider data consumed by the fixed flows.
//!
//! `descriptor` exposes validated metadata ([`ProviderDescriptor`]) covering endpoints,
//! protocol version, signature method, credential placement, and provider quirks (token
//! field names, scope separator, token request verb). `config` deserializes the same data
//! from configuration files and `presets` ships descriptors for well-known providers.

pub mod config;
pub mod descriptor;
pub mod presets;

pub use config::*;
pub use descriptor::*;
pub use presets::*;
