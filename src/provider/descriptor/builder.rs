// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderId},
	error::SignatureError,
	provider::{
		ClientAuthMethod, CredentialPlacement, ProtocolVersion, ProviderDescriptor,
		ProviderEndpoints, ProviderQuirks, TokenRequestMethod,
	},
	sign::SignatureMethod,
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is mandatory for both protocol versions.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for both protocol versions.
	#[error("Missing access token endpoint.")]
	MissingAccessTokenEndpoint,
	/// OAuth 1.0a descriptors need a temporary credential endpoint.
	#[error("OAuth 1.0a descriptors require a request token endpoint.")]
	MissingRequestTokenEndpoint,
	/// Access token field or parameter name is empty.
	#[error("The {field} name cannot be empty.")]
	EmptyTokenKey {
		/// Which name failed validation.
		field: &'static str,
	},
	/// Reject scope separators containing control characters.
	#[error("Scope separator must not contain control characters: {separator:?}.")]
	InvalidScopeSeparator {
		/// Invalid separator that was supplied.
		separator: String,
	},
	/// A configured URL cannot be parsed.
	#[error("The {field} value `{url}` is not a valid URL.")]
	InvalidUrl {
		/// Configuration field holding the URL.
		field: &'static str,
		/// URL that failed to parse.
		url: String,
	},
	/// Signature method is not supported.
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// Descriptor identifier is invalid.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
	/// No preset exists for the requested provider name.
	#[error("No provider preset named `{name}`.")]
	UnknownPreset {
		/// Requested preset name.
		name: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Protocol version spoken by the provider.
	pub version: ProtocolVersion,
	/// OAuth 1.0a temporary credential endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// Base URL for relative API requests.
	pub api_base: Option<Url>,
	/// User profile endpoint.
	pub user_info_endpoint: Option<Url>,
	/// OAuth 1.0a signature method.
	pub signature_method: SignatureMethod,
	/// Credential placement for API requests.
	pub credential_placement: CredentialPlacement,
	/// OAuth 2.0 token endpoint client authentication.
	pub client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier and version.
	pub fn new(id: ProviderId, version: ProtocolVersion) -> Self {
		Self {
			id,
			version,
			request_token_endpoint: None,
			authorization_endpoint: None,
			access_token_endpoint: None,
			api_base: None,
			user_info_endpoint: None,
			signature_method: SignatureMethod::default(),
			credential_placement: CredentialPlacement::default(),
			client_auth_method: ClientAuthMethod::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the OAuth 1.0a request token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the base URL for relative API requests.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the endpoint returning the authenticated user's profile.
	pub fn user_info_endpoint(mut self, url: Url) -> Self {
		self.user_info_endpoint = Some(url);

		self
	}

	/// Overrides the OAuth 1.0a signature method.
	pub fn signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Overrides where API requests carry credentials.
	pub fn credential_placement(mut self, placement: CredentialPlacement) -> Self {
		self.credential_placement = placement;

		self
	}

	/// Overrides the OAuth 2.0 client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Overrides the token response field carrying the access token.
	pub fn access_token_key(mut self, key: impl Into<String>) -> Self {
		self.quirks.access_token_key = key.into();

		self
	}

	/// Overrides the query/body parameter name used for the access token.
	pub fn access_token_param(mut self, param: impl Into<String>) -> Self {
		self.quirks.access_token_param = param.into();

		self
	}

	/// Overrides the scope separator.
	pub fn scope_separator(mut self, separator: impl Into<String>) -> Self {
		self.quirks.scope_separator = separator.into();

		self
	}

	/// Overrides the OAuth 1.0a token endpoint verb.
	pub fn token_request_method(mut self, method: TokenRequestMethod) -> Self {
		self.quirks.token_request_method = method;

		self
	}

	/// Sets the OAuth 1.0a `realm`.
	pub fn realm(mut self, realm: impl Into<String>) -> Self {
		self.quirks.realm = Some(realm.into());

		self
	}

	/// Sets the scopes requested when an authorize URL names none.
	pub fn default_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.quirks.default_scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the provider quirks wholesale.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let access_token =
			self.access_token_endpoint.ok_or(ProviderDescriptorError::MissingAccessTokenEndpoint)?;
		let endpoints = ProviderEndpoints {
			request_token: self.request_token_endpoint,
			authorization,
			access_token,
			api_base: self.api_base,
			user_info: self.user_info_endpoint,
		};
		let descriptor = ProviderDescriptor {
			id: self.id,
			version: self.version,
			endpoints,
			signature_method: self.signature_method,
			credential_placement: self.credential_placement,
			client_auth_method: self.client_auth_method,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.version == ProtocolVersion::OAuth1 && self.endpoints.request_token.is_none() {
			return Err(ProviderDescriptorError::MissingRequestTokenEndpoint);
		}
		if self.quirks.access_token_key.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyTokenKey { field: "access_token_key" });
		}
		if self.quirks.access_token_param.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyTokenKey { field: "access_token_param" });
		}
		if self.quirks.scope_separator.chars().any(char::is_control) {
			return Err(ProviderDescriptorError::InvalidScopeSeparator {
				separator: self.quirks.scope_separator.clone(),
			});
		}

		Ok(())
	}
}
