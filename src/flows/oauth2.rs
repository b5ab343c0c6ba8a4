//! OAuth 2.0 authorization code flow with optional `state`, PKCE (S256), and refresh.
//!
//! Building the authorize URL is pure. Code and refresh exchanges post a form to the token
//! endpoint, accept form or JSON replies, and store the new access token on the client.

// crates.io
use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use oauth2::http::header::{ACCEPT, AUTHORIZATION};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, OAuth2Token, Secret},
	encode::percent_encode,
	error::ConfigError,
	flows::{Client, common},
	http::HttpTransport,
	obs::{self, FlowKind},
	provider::ClientAuthMethod,
	request::{self, Draft},
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;
const CLIENT_AUTH_FIELDS: [&str; 2] = ["client_id", "client_secret"];

/// PKCE verifier and its S256 challenge (RFC 7636).
#[derive(Clone)]
pub struct PkcePair {
	verifier: Secret,
	challenge: String,
}
impl PkcePair {
	/// Generates a random 64-character verifier and derives its challenge.
	pub fn generate() -> Self {
		Self::from_verifier(random_string(PKCE_VERIFIER_LEN))
	}

	/// Derives the challenge for a caller-provided verifier.
	pub fn from_verifier(verifier: impl Into<String>) -> Self {
		let verifier = verifier.into();
		let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));

		Self { verifier: Secret::new(verifier), challenge }
	}

	/// Secret verifier sent with the code exchange.
	pub fn verifier(&self) -> &str {
		self.verifier.expose()
	}

	/// Challenge sent in the authorize URL.
	pub fn challenge(&self) -> &str {
		&self.challenge
	}

	/// Challenge method identifier.
	pub fn method(&self) -> &'static str {
		"S256"
	}
}
impl Debug for PkcePair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PkcePair")
			.field("verifier", &self.verifier)
			.field("challenge", &self.challenge)
			.finish()
	}
}

/// Generates a random alphanumeric `state` value.
pub fn generate_state() -> String {
	random_string(STATE_LEN)
}

/// Inputs for [`OAuth2Flow::authorize_url`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizeParams {
	/// Overrides the client's `redirect_uri`.
	pub redirect_uri: Option<String>,
	/// Requested scopes, joined with the provider's separator.
	pub scopes: Vec<String>,
	/// Opaque `state` value.
	pub state: Option<String>,
	/// PKCE S256 challenge.
	pub code_challenge: Option<String>,
	/// Extra query parameters; never override the parameters above.
	pub extra: Vec<(String, String)>,
}
impl AuthorizeParams {
	/// Sets `redirect_uri`.
	pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}

	/// Appends requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Sets `state`.
	pub fn state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Sends the challenge of `pkce`.
	pub fn pkce(mut self, pkce: &PkcePair) -> Self {
		self.code_challenge = Some(pkce.challenge().to_owned());

		self
	}

	/// Appends an extra query parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.push((key.into(), value.into()));

		self
	}
}

/// Inputs for [`OAuth2Flow::access_token`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessTokenParams {
	/// Overrides the client's `redirect_uri`; must match the one used to authorize.
	pub redirect_uri: Option<String>,
	/// PKCE verifier matching the challenge sent earlier.
	pub code_verifier: Option<String>,
	/// Extra form fields; never override the grant fields or client authentication.
	pub extra: Vec<(String, String)>,
}
impl AccessTokenParams {
	/// Sets `redirect_uri`.
	pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}

	/// Sends the verifier of `pkce`.
	pub fn pkce(mut self, pkce: &PkcePair) -> Self {
		self.code_verifier = Some(pkce.verifier().to_owned());

		self
	}

	/// Appends an extra form field.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.push((key.into(), value.into()));

		self
	}
}

/// OAuth 2.0 flow handle borrowed from a [`Client`].
pub struct OAuth2Flow<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a mut Client<T>,
}
impl<'a, T> OAuth2Flow<'a, T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'a mut Client<T>) -> Self {
		Self { client }
	}

	/// Builds the authorization URL.
	///
	/// `client_id`, `response_type=code`, `redirect_uri` (when known), `scope`, `state`, and
	/// the PKCE challenge each appear once; extra parameters with the same names are dropped.
	/// Without caller scopes the descriptor's default scopes are requested.
	pub fn authorize_url(&self, params: &AuthorizeParams) -> Url {
		let descriptor = &self.client.descriptor;
		let redirect_uri = params.redirect_uri.as_ref().or(self.client.redirect_uri.as_ref());
		let scopes = if params.scopes.is_empty() {
			&descriptor.quirks.default_scopes
		} else {
			&params.scopes
		};
		let scope = common::format_scope(scopes, &descriptor.quirks.scope_separator);
		let mut pairs = vec![
			("client_id".to_owned(), self.client.credentials.client_id.clone()),
			("response_type".to_owned(), "code".to_owned()),
		];

		if let Some(redirect_uri) = redirect_uri {
			pairs.push(("redirect_uri".into(), redirect_uri.clone()));
		}
		if let Some(scope) = scope {
			pairs.push(("scope".into(), scope));
		}
		if let Some(state) = &params.state {
			pairs.push(("state".into(), state.clone()));
		}
		if let Some(challenge) = &params.code_challenge {
			pairs.push(("code_challenge".into(), challenge.clone()));
			pairs.push(("code_challenge_method".into(), "S256".into()));
		}

		merge_extra(&mut pairs, &params.extra);

		let mut url = descriptor.endpoints.authorization.clone();

		request::append_query(&mut url, &pairs);

		url
	}

	/// Exchanges an authorization code for an access token.
	///
	/// On success the access token replaces the one stored on the client.
	pub async fn access_token(
		&mut self,
		code: &str,
		params: AccessTokenParams,
	) -> Result<OAuth2Token> {
		let AccessTokenParams { redirect_uri, code_verifier, extra } = params;
		let redirect_uri = redirect_uri.or_else(|| self.client.redirect_uri.clone());
		let mut form = vec![
			("grant_type".to_owned(), "authorization_code".to_owned()),
			("code".to_owned(), code.to_owned()),
		];

		if let Some(redirect_uri) = redirect_uri {
			form.push(("redirect_uri".into(), redirect_uri));
		}
		if let Some(verifier) = code_verifier {
			form.push(("code_verifier".into(), verifier));
		}

		obs::observe(FlowKind::AuthorizationCode, "access_token", async move {
			self.grant(FlowKind::AuthorizationCode, form, &extra).await
		})
		.await
	}

	/// Redeems a refresh token for a new access token.
	pub async fn refresh(&mut self, refresh_token: &str) -> Result<OAuth2Token> {
		let form = vec![
			("grant_type".to_owned(), "refresh_token".to_owned()),
			("refresh_token".to_owned(), refresh_token.to_owned()),
		];

		obs::observe(FlowKind::Refresh, "refresh", async move {
			self.grant(FlowKind::Refresh, form, &[]).await
		})
		.await
	}

	async fn grant(
		&mut self,
		flow: FlowKind,
		mut form: Vec<(String, String)>,
		extra: &[(String, String)],
	) -> Result<OAuth2Token> {
		let descriptor = &self.client.descriptor;
		let credentials = &self.client.credentials;

		credentials.ensure_client()?;

		let mut draft = Draft::new(Method::POST, descriptor.endpoints.access_token.clone());

		draft.headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

		match descriptor.client_auth_method {
			ClientAuthMethod::ClientSecretPost => {
				form.push(("client_id".into(), credentials.client_id.clone()));

				if !credentials.client_secret.is_empty() {
					form.push(("client_secret".into(), credentials.client_secret.expose().into()));
				}
			},
			ClientAuthMethod::ClientSecretBasic => {
				let mut value =
					HeaderValue::from_str(&basic_auth(credentials)).map_err(ConfigError::from)?;

				value.set_sensitive(true);
				draft.headers.insert(AUTHORIZATION, value);
			},
		}

		// Client authentication comes from the credentials only, whatever the method.
		merge_extra(
			&mut form,
			extra.iter().filter(|(key, _)| !CLIENT_AUTH_FIELDS.contains(&key.as_str())),
		);
		draft.append_form(form)?;

		let mut reply = common::exchange(self.client, flow, draft).await?;
		let access_token = Secret::new(reply.require(flow, &descriptor.quirks.access_token_key)?);

		self.client.credentials = ClientCredentials {
			access_token: Some(access_token.clone()),
			..self.client.credentials.clone()
		};

		Ok(OAuth2Token { access_token, extra: reply.params })
	}
}

/// Appends extra pairs whose keys are not already present.
fn merge_extra<'a, I>(pairs: &mut Vec<(String, String)>, extra: I)
where
	I: IntoIterator<Item = &'a (String, String)>,
{
	for (key, value) in extra {
		if !pairs.iter().any(|(existing, _)| existing == key) {
			pairs.push((key.clone(), value.clone()));
		}
	}
}

fn basic_auth(credentials: &ClientCredentials) -> String {
	let raw = format!(
		"{}:{}",
		percent_encode(&credentials.client_id),
		percent_encode(credentials.client_secret.expose())
	);

	format!("Basic {}", STANDARD.encode(raw))
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
