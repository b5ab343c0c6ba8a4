//! Shared helpers for flow implementations (token endpoint exchanges, scope formatting).

// self
use crate::{
	_prelude::*,
	error::TokenExchangeError,
	flows::Client,
	http::HttpTransport,
	obs::FlowKind,
	request::Draft,
	response::{self, ResponseParams},
};

/// Parsed token endpoint reply plus the raw payload for diagnostics.
#[derive(Debug)]
pub(crate) struct TokenReply {
	pub(crate) params: ResponseParams,
	payload: String,
}
impl TokenReply {
	/// Removes a mandatory string field, failing with the raw payload attached.
	pub(crate) fn require(
		&mut self,
		flow: FlowKind,
		field: &str,
	) -> Result<String, TokenExchangeError> {
		match self.params.take_str(field) {
			Some(value) if !value.is_empty() => Ok(value),
			_ => Err(TokenExchangeError::MissingField {
				flow,
				field: field.to_owned(),
				payload: self.payload.clone(),
			}),
		}
	}
}

/// Sends a token endpoint request and parses its reply.
pub(crate) async fn exchange<T>(
	client: &Client<T>,
	flow: FlowKind,
	draft: Draft,
) -> Result<TokenReply>
where
	T: ?Sized + HttpTransport,
{
	let request = draft.finish()?;
	let response = client.dispatch(request).await?;
	let params = response::token_response(flow, &response)?;

	Ok(TokenReply { params, payload: response::lossy(response.body()).into_owned() })
}

/// Joins scopes with the provider's separator; `None` when there is nothing to send.
pub(crate) fn format_scope<S>(scopes: &[S], separator: &str) -> Option<String>
where
	S: AsRef<str>,
{
	let mut buf = String::new();

	for scope in scopes.iter().map(AsRef::as_ref).filter(|scope| !scope.is_empty()) {
		if !buf.is_empty() {
			buf.push_str(separator);
		}

		buf.push_str(scope);
	}

	if buf.is_empty() { None } else { Some(buf) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scope_formatting_handles_custom_separators() {
		assert_eq!(format_scope(&["email", "profile"], " "), Some("email profile".into()));
		assert_eq!(format_scope(&["email", "profile"], ","), Some("email,profile".into()));
		assert_eq!(format_scope(&["", "read"], " "), Some("read".into()));
		assert_eq!(format_scope::<&str>(&[], " "), None);
	}

	#[test]
	fn missing_fields_carry_payload() {
		let mut reply = TokenReply {
			params: [("oauth_token_secret", "s")].into_iter().collect(),
			payload: "oauth_token_secret=s".into(),
		};
		let err =
			reply.require(FlowKind::RequestToken, "oauth_token").expect_err("Token is absent.");

		assert!(matches!(
			err,
			TokenExchangeError::MissingField { ref field, .. } if field == "oauth_token"
		));
		assert_eq!(err.payload(), "oauth_token_secret=s");
	}
}
