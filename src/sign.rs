//! OAuth 1.0a signature engine.
//!
//! [`SignatureInput`] normalizes a request into the canonical base string (uppercase method,
//! scheme/authority/path URI, and the sorted, percent-encoded parameter list) and
//! [`SignatureMethod`] turns it into the `oauth_signature` value. Parameters are sorted by
//! encoded key and then encoded value, so callers can supply them in any order.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	encode::percent_encode,
	error::SignatureError,
};

type HmacSha1 = Hmac<Sha1>;

/// Parameter that never participates in its own base string.
const SIGNATURE_PARAM: &str = "oauth_signature";

/// Signature methods understood by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// `HMAC-SHA1`: base64 HMAC-SHA1 digest of the base string.
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// `PLAINTEXT`: the signing key itself.
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Returns the wire identifier sent as `oauth_signature_method`.
	pub const fn as_str(self) -> &'static str {
		match self {
			SignatureMethod::HmacSha1 => "HMAC-SHA1",
			SignatureMethod::Plaintext => "PLAINTEXT",
		}
	}

	/// Signs an already-built base string.
	pub fn sign_base_string(
		self,
		base_string: &str,
		consumer_secret: &str,
		token_secret: Option<&str>,
	) -> Result<String, SignatureError> {
		let key = signing_key(consumer_secret, token_secret);

		match self {
			SignatureMethod::HmacSha1 => {
				let mut mac = HmacSha1::new_from_slice(key.as_bytes())
					.map_err(|_| SignatureError::InvalidKey)?;

				mac.update(base_string.as_bytes());

				Ok(STANDARD.encode(mac.finalize().into_bytes()))
			},
			SignatureMethod::Plaintext => Ok(key),
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SignatureMethod {
	type Err = SignatureError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			m if m.eq_ignore_ascii_case("HMAC-SHA1") => Ok(Self::HmacSha1),
			m if m.eq_ignore_ascii_case("PLAINTEXT") => Ok(Self::Plaintext),
			other => Err(SignatureError::UnsupportedMethod { method: other.to_owned() }),
		}
	}
}

/// Request description fed to the signature engine.
///
/// Query pairs already present on `url` join `params` in the base string; the URI part of
/// the base string drops the query and fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureInput {
	/// HTTP method (normalized to uppercase).
	pub method: String,
	/// Absolute request URL.
	pub url: String,
	/// OAuth and request parameters, in caller order.
	pub params: Vec<(String, String)>,
}
impl SignatureInput {
	/// Creates an input without parameters.
	pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
		Self { method: method.into(), url: url.into(), params: Vec::new() }
	}

	/// Appends a single parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));

		self
	}

	/// Appends every parameter yielded by `params`.
	pub fn params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.params.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));

		self
	}

	/// Builds the canonical `METHOD&URI&PARAMS` base string.
	pub fn base_string(&self) -> Result<String, SignatureError> {
		let method = self.method.trim();

		if method.is_empty() {
			return Err(SignatureError::EmptyMethod);
		}

		let (uri, query) = self.split_url()?;
		let params = self.normalized_params(&query);

		Ok(format!(
			"{}&{}&{}",
			method.to_ascii_uppercase(),
			percent_encode(&uri),
			percent_encode(&params)
		))
	}

	fn split_url(&self) -> Result<(String, Vec<(String, String)>), SignatureError> {
		let raw = self.url.trim();

		if raw.is_empty() {
			return Err(SignatureError::EmptyUrl);
		}

		let mut url =
			Url::parse(raw).map_err(|_| SignatureError::InvalidUrl { url: raw.to_owned() })?;

		if url.cannot_be_a_base() {
			return Err(SignatureError::InvalidUrl { url: raw.to_owned() });
		}

		let query = url.query_pairs().into_owned().collect();

		url.set_query(None);
		url.set_fragment(None);

		Ok((url.into(), query))
	}

	fn normalized_params(&self, query: &[(String, String)]) -> String {
		let mut encoded = self
			.params
			.iter()
			.chain(query)
			.filter(|(key, _)| key != SIGNATURE_PARAM)
			.map(|(key, value)| (percent_encode(key), percent_encode(value)))
			.collect::<Vec<_>>();

		encoded.sort();

		// Already encoded; join without a second pass.
		let mut buf = String::new();

		for (idx, (key, value)) in encoded.iter().enumerate() {
			if idx > 0 {
				buf.push('&');
			}

			buf.push_str(key);
			buf.push('=');
			buf.push_str(value);
		}

		buf
	}
}

/// Builds `encode(consumer_secret)&encode(token_secret or "")`.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
	format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret.unwrap_or_default()))
}

/// Computes the `oauth_signature` value for `input`.
pub fn sign(
	method: SignatureMethod,
	input: &SignatureInput,
	consumer_secret: &str,
	token_secret: Option<&str>,
) -> Result<String, SignatureError> {
	let base_string = input.base_string()?;

	method.sign_base_string(&base_string, consumer_secret, token_secret)
}

/// Renders OAuth parameters as an `Authorization: OAuth ...` header value.
///
/// `realm`, when present, comes first and is quoted verbatim; every other pair is
/// percent-encoded and emitted in the order given.
pub fn authorization_header(realm: Option<&str>, oauth_params: &[(String, String)]) -> String {
	let mut parts = Vec::with_capacity(oauth_params.len() + 1);

	if let Some(realm) = realm {
		parts.push(format!("realm=\"{realm}\""));
	}

	parts.extend(oauth_params.iter().map(|(key, value)| {
		format!("{}=\"{}\"", percent_encode(key), percent_encode(value))
	}));

	format!("OAuth {}", parts.join(", "))
}
