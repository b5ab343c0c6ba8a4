//! Handshake flows bound to one provider descriptor and one set of client credentials.
//!
//! [`Client`] owns the transport, the descriptor, and the credentials. The OAuth 1.0a
//! three-legged flow lives in [`OAuth1Flow`] and the OAuth 2.0 authorization code flow in
//! [`OAuth2Flow`]; both borrow the client mutably so a completed exchange can replace its
//! credentials. Calls on one client are expected to be serialized by the caller.

pub mod oauth1;
pub mod oauth2;

mod common;

pub use self::{oauth1::*, oauth2::*};

// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	error::TransportError,
	http::{HttpResponse, HttpTransport},
	obs,
	provider::{ProtocolVersion, ProviderDescriptor},
	request::AuthorizedRequest,
};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestOAuthClient = Client<ReqwestTransport>;

/// OAuth client for a single provider.
///
/// The descriptor is immutable and shared; credentials are owned by this instance and
/// replaced wholesale whenever a flow completes a token exchange.
pub struct Client<T>
where
	T: ?Sized + HttpTransport,
{
	pub(crate) transport: Arc<T>,
	pub(crate) descriptor: Arc<ProviderDescriptor>,
	pub(crate) credentials: ClientCredentials,
	pub(crate) redirect_uri: Option<String>,
	pub(crate) oauth1_state: OAuth1State,
}
impl<T> Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client that sends through the caller-provided transport.
	pub fn with_transport(
		descriptor: impl Into<Arc<ProviderDescriptor>>,
		credentials: ClientCredentials,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let oauth1_state = OAuth1State::for_credentials(&credentials);

		Self {
			transport: transport.into(),
			descriptor: descriptor.into(),
			credentials,
			redirect_uri: None,
			oauth1_state,
		}
	}

	/// Sets the OAuth 2.0 `redirect_uri` used by authorize URLs and code exchanges.
	pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}

	/// Provider descriptor driving this client.
	pub fn descriptor(&self) -> &ProviderDescriptor {
		&self.descriptor
	}

	/// Current credentials.
	pub fn credentials(&self) -> &ClientCredentials {
		&self.credentials
	}

	/// Replaces the credentials wholesale, e.g. with tokens restored from storage.
	pub fn set_credentials(&mut self, credentials: ClientCredentials) {
		self.oauth1_state = OAuth1State::for_credentials(&credentials);
		self.credentials = credentials;
	}

	/// Current OAuth 1.0a handshake state.
	pub fn oauth1_state(&self) -> OAuth1State {
		self.oauth1_state
	}

	/// Borrows the OAuth 1.0a flow; fails unless the descriptor speaks OAuth 1.0a.
	pub fn oauth1(&mut self) -> Result<OAuth1Flow<'_, T>> {
		self.descriptor.ensure_version(ProtocolVersion::OAuth1)?;

		Ok(OAuth1Flow::new(self))
	}

	/// Borrows the OAuth 2.0 flow; fails unless the descriptor speaks OAuth 2.0.
	pub fn oauth2(&mut self) -> Result<OAuth2Flow<'_, T>> {
		self.descriptor.ensure_version(ProtocolVersion::OAuth2)?;

		Ok(OAuth2Flow::new(self))
	}

	/// Sends an authorized request; the only suspension point of every operation.
	pub(crate) async fn dispatch(&self, request: AuthorizedRequest) -> Result<HttpResponse> {
		obs::trace_dispatch(&request.method, &request.url);

		let url = request.url.clone();
		let request = request.into_http()?;
		let response = self.transport.send(request).await.map_err(TransportError::network)?;
		let status = response.status().as_u16();

		obs::trace_reply(&url, status);
		obs::record_provider_status(status);

		Ok(response)
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(
		descriptor: impl Into<Arc<ProviderDescriptor>>,
		credentials: ClientCredentials,
	) -> Self {
		Self::with_transport(descriptor, credentials, ReqwestTransport::default())
	}
}
impl<T> Clone for Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			descriptor: self.descriptor.clone(),
			credentials: self.credentials.clone(),
			redirect_uri: self.redirect_uri.clone(),
			oauth1_state: self.oauth1_state,
		}
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("descriptor", &self.descriptor.id)
			.field("version", &self.descriptor.version)
			.field("credentials", &self.credentials)
			.field("redirect_uri", &self.redirect_uri)
			.field("oauth1_state", &self.oauth1_state)
			.finish()
	}
}
