//! Provider descriptor data structures shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, and provider quirk
//! toggles so deviations from the nominal protocols stay data instead of branching code.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId, error::ConfigError, sign::SignatureMethod};

/// OAuth protocol version spoken by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
	/// OAuth 1.0a three-legged flow with signed requests.
	#[serde(rename = "1.0", alias = "1.0a", alias = "1")]
	OAuth1,
	/// OAuth 2.0 authorization code flow with bearer tokens.
	#[serde(rename = "2.0", alias = "2")]
	OAuth2,
}
impl ProtocolVersion {
	/// Returns the configuration label (`1.0` or `2.0`).
	pub const fn as_str(self) -> &'static str {
		match self {
			ProtocolVersion::OAuth1 => "1.0",
			ProtocolVersion::OAuth2 => "2.0",
		}
	}
}
impl Display for ProtocolVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where authentication material is embedded in outgoing API requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialPlacement {
	/// `Authorization: OAuth ...` or `Authorization: Bearer ...`.
	#[default]
	Header,
	/// Query string parameters.
	Query,
	/// Form-encoded body parameters.
	Body,
}
impl CredentialPlacement {
	/// Returns the configuration label.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialPlacement::Header => "header",
			CredentialPlacement::Query => "query",
			CredentialPlacement::Body => "body",
		}
	}
}
impl Display for CredentialPlacement {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Client authentication modes for OAuth 2.0 token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// Form POST body parameters for `client_id`/`client_secret`.
	#[default]
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// OAuth 1.0a temporary credential endpoint.
	pub request_token: Option<Url>,
	/// Resource-owner authorization endpoint.
	pub authorization: Url,
	/// Token endpoint (OAuth 1.0a token credentials or OAuth 2.0 access tokens).
	pub access_token: Url,
	/// Base URL that relative API request URLs are joined onto.
	pub api_base: Option<Url>,
	/// Endpoint returning the authenticated user's profile.
	pub user_info: Option<Url>,
}

/// Immutable provider descriptor consumed by flows and the request builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Protocol version spoken by the provider.
	pub version: ProtocolVersion,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// OAuth 1.0a signature method.
	pub signature_method: SignatureMethod,
	/// Where API requests carry credentials.
	pub credential_placement: CredentialPlacement,
	/// OAuth 2.0 token endpoint client authentication.
	pub client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier and protocol version.
	pub fn builder(id: ProviderId, version: ProtocolVersion) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id, version)
	}

	/// Resolves an API URL, joining relative paths onto the descriptor's base URL.
	pub fn resolve_url(&self, raw: &str) -> Result<Url, ConfigError> {
		match Url::parse(raw) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) => match &self.endpoints.api_base {
				Some(base) => base.join(raw).map_err(|e| ConfigError::invalid_url(raw, e)),
				None => Err(ConfigError::invalid_url(raw, url::ParseError::RelativeUrlWithoutBase)),
			},
			Err(e) => Err(ConfigError::invalid_url(raw, e)),
		}
	}

	/// Fails with [`ConfigError::VersionMismatch`] unless the descriptor speaks `expected`.
	pub fn ensure_version(&self, expected: ProtocolVersion) -> Result<(), ConfigError> {
		if self.version == expected {
			Ok(())
		} else {
			Err(ConfigError::VersionMismatch {
				descriptor: self.id.to_string(),
				expected: expected.as_str(),
				actual: self.version.as_str(),
			})
		}
	}
}
