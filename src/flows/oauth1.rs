//! OAuth 1.0a three-legged flow: request token, user authorization, access token.
//!
//! State moves `Unauthenticated → RequestTokenObtained → Authorized` and only after a
//! response has been fully parsed, so a failed or cancelled exchange leaves the client
//! as it was.

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, OAuth1Token, Secret},
	flows::{Client, common},
	http::HttpTransport,
	obs::{self, FlowKind},
	provider::ProviderDescriptorError,
	request::{self, Draft, OAuth1Signer},
};

/// Position of a client in the OAuth 1.0a handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OAuth1State {
	/// No token has been obtained yet.
	#[default]
	Unauthenticated,
	/// Temporary credentials are held; the user still has to authorize them.
	RequestTokenObtained,
	/// Token credentials are held and API requests can be signed with them.
	Authorized,
}
impl OAuth1State {
	/// Clients constructed with a token already hold token credentials.
	pub(crate) fn for_credentials(credentials: &ClientCredentials) -> Self {
		if credentials.token.is_some() { Self::Authorized } else { Self::Unauthenticated }
	}
}

/// Extra inputs for the temporary credential request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestTokenParams {
	/// `oauth_callback` value (`oob` for out-of-band verifiers).
	pub callback: Option<String>,
	/// Additional parameters, signed and sent in the query string.
	pub params: Vec<(String, String)>,
}
impl RequestTokenParams {
	/// Sets `oauth_callback`.
	pub fn callback(mut self, callback: impl Into<String>) -> Self {
		self.callback = Some(callback.into());

		self
	}

	/// Appends an extra parameter (`scope`, `x_auth_access_type`, ...).
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));

		self
	}
}

/// OAuth 1.0a flow handle borrowed from a [`Client`].
pub struct OAuth1Flow<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a mut Client<T>,
}
impl<'a, T> OAuth1Flow<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a mut Client<T>) -> Self {
		Self { client }
	}

	/// Obtains temporary credentials from the request token endpoint.
	///
	/// The call is signed with the consumer credentials only. On success the returned token
	/// pair is stored on the client and the state becomes
	/// [`OAuth1State::RequestTokenObtained`].
	pub async fn request_token(&mut self, params: RequestTokenParams) -> Result<OAuth1Token> {
		const KIND: FlowKind = FlowKind::RequestToken;

		obs::observe(KIND, "request_token", async move {
			let descriptor = &self.client.descriptor;
			let url = descriptor
				.endpoints
				.request_token
				.clone()
				.ok_or(ProviderDescriptorError::MissingRequestTokenEndpoint)?;
			let mut draft = Draft::new(descriptor.quirks.token_request_method.method(), url);
			let (mut protocol, extra) = request::split_protocol_params(params.params);

			if let Some(callback) = params.callback {
				protocol.push(("oauth_callback".into(), callback));
			}

			draft.append_query(&extra);
			OAuth1Signer::new(descriptor, &self.client.credentials)?.apply(&mut draft, protocol)?;

			let token = self.finish_exchange(KIND, draft).await?;

			self.client.oauth1_state = OAuth1State::RequestTokenObtained;

			Ok(token)
		})
		.await
	}

	/// Builds the URL the user visits to authorize `request_token`.
	///
	/// Pure: no network call and no state change. Existing query parameters on the
	/// authorization endpoint are kept.
	pub fn authorize_url(&self, request_token: &str) -> Url {
		let mut url = self.client.descriptor.endpoints.authorization.clone();

		request::append_query(&mut url, &[("oauth_token".into(), request_token.into())]);

		url
	}

	/// Exchanges an authorized request token and its verifier for token credentials.
	///
	/// The call is signed with the given request token pair, not with whatever the client
	/// currently holds. On success the new pair replaces the client's token and the state
	/// becomes [`OAuth1State::Authorized`].
	pub async fn access_token(
		&mut self,
		request_token: &str,
		request_token_secret: &str,
		verifier: &str,
	) -> Result<OAuth1Token> {
		const KIND: FlowKind = FlowKind::AccessToken;

		obs::observe(KIND, "access_token", async move {
			let descriptor = &self.client.descriptor;
			let mut draft = Draft::new(
				descriptor.quirks.token_request_method.method(),
				descriptor.endpoints.access_token.clone(),
			);

			OAuth1Signer::new(descriptor, &self.client.credentials)?
				.with_token(request_token, Some(request_token_secret))
				.apply(&mut draft, vec![("oauth_verifier".into(), verifier.into())])?;

			let token = self.finish_exchange(KIND, draft).await?;

			self.client.oauth1_state = OAuth1State::Authorized;

			Ok(token)
		})
		.await
	}

	/// Sends a token endpoint call, extracts the token pair, and stores it on the client.
	async fn finish_exchange(&mut self, flow: FlowKind, draft: Draft) -> Result<OAuth1Token> {
		let mut reply = common::exchange(self.client, flow, draft).await?;
		let token = reply.require(flow, "oauth_token")?;
		let token_secret = reply.params.take_str("oauth_token_secret").map(Secret::new);

		self.client.credentials = ClientCredentials {
			token: Some(token.clone()),
			token_secret: token_secret.clone(),
			..self.client.credentials.clone()
		};

		Ok(OAuth1Token { token, token_secret, extra: reply.params })
	}
}
