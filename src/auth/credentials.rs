//! Client credentials owned by a single client instance.

// self
use crate::{_prelude::*, auth::Secret, error::NotAuthenticatedError};

/// Consumer/client credentials plus whatever tokens the flows have obtained so far.
///
/// OAuth 1.0a clients use `token`/`token_secret`; OAuth 2.0 clients use `access_token`.
/// Flows replace the value wholesale after a successful token exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
	/// OAuth 1.0a consumer key or OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 1.0a consumer secret or OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// OAuth 1.0a token (temporary or token credential).
	pub token: Option<String>,
	/// OAuth 1.0a token secret.
	pub token_secret: Option<Secret>,
	/// OAuth 2.0 access token.
	pub access_token: Option<Secret>,
}
impl ClientCredentials {
	/// Creates credentials carrying only the client identity.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			..Default::default()
		}
	}

	/// Attaches an OAuth 1.0a token pair.
	pub fn with_token_pair(mut self, token: impl Into<String>, secret: impl Into<Secret>) -> Self {
		self.token = Some(token.into());
		self.token_secret = Some(secret.into());

		self
	}

	/// Attaches an OAuth 2.0 access token.
	pub fn with_access_token(mut self, access_token: impl Into<Secret>) -> Self {
		self.access_token = Some(access_token.into());

		self
	}

	/// Fails unless the client identifier is present.
	pub fn ensure_client(&self) -> Result<(), NotAuthenticatedError> {
		if self.client_id.trim().is_empty() {
			return Err(NotAuthenticatedError::MissingClientCredentials);
		}

		Ok(())
	}

	/// Returns the OAuth 1.0a token and its secret, if a token is present.
	///
	/// A token without a secret signs with an empty token secret; a secret without a token
	/// is rejected.
	pub fn token_pair(&self) -> Result<Option<(&str, Option<&str>)>, NotAuthenticatedError> {
		match (&self.token, &self.token_secret) {
			(Some(token), secret) =>
				Ok(Some((token.as_str(), secret.as_ref().map(Secret::expose)))),
			(None, Some(_)) => Err(NotAuthenticatedError::IncompleteTokenPair),
			(None, None) => Ok(None),
		}
	}

	/// Returns the OAuth 2.0 access token when one is set and non-empty.
	pub fn bearer(&self) -> Option<&str> {
		self.access_token.as_ref().map(Secret::expose).filter(|token| !token.is_empty())
	}
}
