//! Crate-level error types shared across signing, flows, and request building.

// self
use crate::{_prelude::*, obs::FlowKind, provider::ProviderDescriptorError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Each variant names the phase that failed so callers can decide whether to retry,
/// re-authorize, or fix their configuration.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Signing inputs were malformed or the signature method is unsupported.
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// Token endpoint response was missing fields or carried a provider error.
	#[error(transparent)]
	TokenExchange(#[from] TokenExchangeError),
	/// Authenticated request attempted without the credentials it needs.
	#[error(transparent)]
	NotAuthenticated(#[from] NotAuthenticatedError),
	/// Transport failure (network, non-2xx without a provider payload).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

impl From<ProviderDescriptorError> for Error {
	fn from(e: ProviderDescriptorError) -> Self {
		Self::Config(e.into())
	}
}

/// Failures raised while computing an OAuth 1.0a signature.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SignatureError {
	/// HTTP method was empty.
	#[error("Signature input is missing the HTTP method.")]
	EmptyMethod,
	/// Request URL was empty.
	#[error("Signature input is missing the request URL.")]
	EmptyUrl,
	/// Request URL cannot be normalized into a base-string URI.
	#[error("Signature input URL `{url}` cannot be normalized.")]
	InvalidUrl {
		/// URL that failed normalization.
		url: String,
	},
	/// HMAC implementation rejected the signing key.
	#[error("Signing key was rejected by the HMAC implementation.")]
	InvalidKey,
	/// Signature method is not implemented.
	#[error("Signature method `{method}` is not supported.")]
	UnsupportedMethod {
		/// Method name as requested.
		method: String,
	},
}

/// Token endpoint failures surfaced with the provider's raw payload.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Provider returned an explicit error object.
	#[error("Provider rejected the {flow} exchange: {error}{}.", describe(.description))]
	Provider {
		/// Flow step that failed.
		flow: FlowKind,
		/// Provider `error` (or OAuth 1.0a `oauth_problem`) value.
		error: String,
		/// Provider `error_description` (or `oauth_problem_advice`) value.
		description: Option<String>,
		/// HTTP status code of the response.
		status: u16,
		/// Raw response body.
		payload: String,
	},
	/// Response parsed but lacked a required field.
	#[error("The {flow} response is missing `{field}`.")]
	MissingField {
		/// Flow step that failed.
		flow: FlowKind,
		/// Field that was expected.
		field: String,
		/// Raw response body.
		payload: String,
	},
	/// Response declared JSON but the body could not be decoded.
	#[error("The {flow} response contains malformed JSON.")]
	MalformedJson {
		/// Flow step that failed.
		flow: FlowKind,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Raw response body.
		payload: String,
	},
	/// Response body is not a key/value document.
	#[error("The {flow} response is not a key/value document.")]
	NotAnObject {
		/// Flow step that failed.
		flow: FlowKind,
		/// Raw response body.
		payload: String,
	},
}
impl TokenExchangeError {
	/// Raw provider payload attached to the failure.
	pub fn payload(&self) -> &str {
		match self {
			Self::Provider { payload, .. }
			| Self::MissingField { payload, .. }
			| Self::MalformedJson { payload, .. }
			| Self::NotAnObject { payload, .. } => payload,
		}
	}
}

fn describe(description: &Option<String>) -> String {
	description.as_deref().map(|text| format!(" ({text})")).unwrap_or_default()
}

/// Credentials required by the descriptor's placement rule are missing.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum NotAuthenticatedError {
	/// OAuth 2.0 request without an access token.
	#[error("No access token is available for the {placement} placement.")]
	MissingAccessToken {
		/// Placement label that required the token.
		placement: &'static str,
	},
	/// OAuth 1.0a token present without its secret (or vice versa).
	#[error("OAuth 1.0a credentials carry an incomplete token pair.")]
	IncompleteTokenPair,
	/// Client identifier is empty.
	#[error("Client credentials are missing the client identifier.")]
	MissingClientCredentials,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] ProviderDescriptorError),
	/// URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Raw URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Header value contains forbidden characters.
	#[error(transparent)]
	InvalidHeader(#[from] oauth2::http::header::InvalidHeaderValue),
	/// Flow invoked on a descriptor for the other protocol version.
	#[error("Descriptor `{descriptor}` speaks OAuth {actual}, not OAuth {expected}.")]
	VersionMismatch {
		/// Provider identifier string.
		descriptor: String,
		/// Version the caller asked for.
		expected: &'static str,
		/// Version the descriptor declares.
		actual: &'static str,
	},
	/// Descriptor declares no user profile endpoint.
	#[error("Descriptor `{descriptor}` declares no user info endpoint.")]
	MissingUserInfoEndpoint {
		/// Descriptor identifier.
		descriptor: String,
	},
	/// Body placement needs a form-encoded (or empty) body.
	#[error("Body credential placement requires a form-encoded request body.")]
	BodyPlacementRequiresForm,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
		Self::InvalidUrl { url: url.into(), source }
	}
}

/// Transport-level failures (network, IO, unexpected status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Provider answered with a non-2xx status and no recognizable error payload.
	#[error("Provider responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Raw response body.
		body: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
