//! Token exchange results.
//!
//! Each flow step returns the token it was after plus every other field the provider sent,
//! in the order it sent them (`user_id`, `screen_name`, `expires_in`, ...).

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, auth::Secret, response::ResponseParams};

/// OAuth 1.0a request-token or access-token result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Token {
	/// `oauth_token`.
	pub token: String,
	/// `oauth_token_secret`, when the provider issued one.
	pub token_secret: Option<Secret>,
	/// Remaining response fields.
	pub extra: ResponseParams,
}
impl OAuth1Token {
	/// Returns the `oauth_callback_confirmed` flag of a request-token response.
	pub fn callback_confirmed(&self) -> Option<bool> {
		self.extra.get_str("oauth_callback_confirmed").map(|flag| flag == "true")
	}
}

/// OAuth 2.0 access-token result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
	/// Access token taken from the descriptor's configured response field.
	pub access_token: Secret,
	/// Remaining response fields (`token_type`, `refresh_token`, `expires_in`, ...).
	pub extra: ResponseParams,
}
impl OAuth2Token {
	/// Returns the `token_type` field.
	pub fn token_type(&self) -> Option<&str> {
		self.extra.get_str("token_type")
	}

	/// Returns the `refresh_token` field.
	pub fn refresh_token(&self) -> Option<&str> {
		self.extra.get_str("refresh_token")
	}

	/// Returns the `scope` field.
	pub fn scope(&self) -> Option<&str> {
		self.extra.get_str("scope")
	}

	/// Returns `expires_in` whether the provider sent it as a number or a string.
	pub fn expires_in(&self) -> Option<Duration> {
		match self.extra.get("expires_in")? {
			Value::Number(n) => n.as_i64().map(Duration::seconds),
			Value::String(s) => s.trim().parse::<i64>().ok().map(Duration::seconds),
			_ => None,
		}
	}
}
