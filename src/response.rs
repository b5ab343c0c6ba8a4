//! Token endpoint response parsing.
//!
//! Providers answer with either `application/x-www-form-urlencoded` or JSON documents.
//! Both normalize into [`ResponseParams`], an insertion-ordered key/value map. The
//! `Content-Type` header decides the format; without one, a body that opens with `{` is
//! treated as JSON and anything else as form data.

// std
use std::borrow::Cow;
// crates.io
use oauth2::{HttpResponse, http::header::CONTENT_TYPE};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::{TokenExchangeError, TransportError},
	http::parse_retry_after,
	obs::FlowKind,
};

/// Ordered key/value document returned by a token endpoint.
///
/// Form values are stored as JSON strings so both formats share one representation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseParams(Map<String, Value>);
impl ResponseParams {
	/// Returns the raw value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the value under `key` when it is a JSON string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}

	/// Returns true if `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no entries are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates entries in the order the provider sent them.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Consumes the wrapper, returning the underlying ordered map.
	pub fn into_inner(self) -> Map<String, Value> {
		self.0
	}

	/// Removes `key` (keeping the order of the remaining entries) and returns its value.
	pub(crate) fn take(&mut self, key: &str) -> Option<Value> {
		self.0.shift_remove(key)
	}

	/// Removes `key` when it holds a string; other value kinds stay in place.
	pub(crate) fn take_str(&mut self, key: &str) -> Option<String> {
		match self.0.get(key) {
			Some(Value::String(_)) => match self.take(key) {
				Some(Value::String(value)) => Some(value),
				_ => None,
			},
			_ => None,
		}
	}
}
impl<K, V> FromIterator<(K, V)> for ResponseParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), Value::String(v.into()))).collect())
	}
}

/// Wire format chosen for a response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyFormat {
	/// `application/json` (or any `+json` media type).
	Json,
	/// `application/x-www-form-urlencoded` and every other textual type.
	Form,
}
impl BodyFormat {
	/// Picks the format from the `Content-Type` header, sniffing the body only when the
	/// header is absent.
	pub fn detect(headers: &HeaderMap, body: &[u8]) -> Self {
		match headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()) {
			Some(content_type) => {
				let media_type = content_type.split(';').next().unwrap_or_default();

				if media_type.trim().to_ascii_lowercase().contains("json") {
					Self::Json
				} else {
					Self::Form
				}
			},
			None =>
				if body.trim_ascii_start().starts_with(b"{") {
					Self::Json
				} else {
					Self::Form
				},
		}
	}
}

/// Parses a token endpoint body into [`ResponseParams`].
pub fn parse_params(
	flow: FlowKind,
	headers: &HeaderMap,
	body: &[u8],
) -> Result<ResponseParams, TokenExchangeError> {
	match BodyFormat::detect(headers, body) {
		BodyFormat::Json => parse_json(flow, body),
		BodyFormat::Form => parse_form(flow, body),
	}
}

fn parse_json(flow: FlowKind, body: &[u8]) -> Result<ResponseParams, TokenExchangeError> {
	let mut de = serde_json::Deserializer::from_slice(body);
	let value: Value = serde_path_to_error::deserialize(&mut de).map_err(|source| {
		TokenExchangeError::MalformedJson { flow, source, payload: lossy(body).into_owned() }
	})?;

	match value {
		Value::Object(map) => Ok(ResponseParams(map)),
		_ => Err(TokenExchangeError::NotAnObject { flow, payload: lossy(body).into_owned() }),
	}
}

fn parse_form(flow: FlowKind, body: &[u8]) -> Result<ResponseParams, TokenExchangeError> {
	let text = lossy(body);
	let trimmed = text.trim();

	if !trimmed.is_empty() && !trimmed.contains('=') {
		return Err(TokenExchangeError::NotAnObject { flow, payload: text.into_owned() });
	}

	Ok(url::form_urlencoded::parse(trimmed.as_bytes())
		.filter(|(key, _)| !key.is_empty())
		.map(|(k, v)| (k.into_owned(), v.into_owned()))
		.collect())
}

/// Turns a token endpoint response into parameters, applying error precedence.
///
/// A provider error payload wins over the HTTP status (some providers answer `200` with an
/// `error` field); otherwise non-2xx statuses become [`TransportError::Status`].
pub(crate) fn token_response(flow: FlowKind, response: &HttpResponse) -> Result<ResponseParams> {
	let status = response.status();
	let body = response.body();
	let parsed = parse_params(flow, response.headers(), body);

	if let Ok(params) = &parsed
		&& let Some((error, description)) = provider_error(params)
	{
		return Err(TokenExchangeError::Provider {
			flow,
			error,
			description,
			status: status.as_u16(),
			payload: lossy(body).into_owned(),
		}
		.into());
	}
	if !status.is_success() {
		return Err(TransportError::Status {
			status: status.as_u16(),
			retry_after: parse_retry_after(response.headers()),
			body: lossy(body).into_owned(),
		}
		.into());
	}

	parsed.map_err(Into::into)
}

/// Extracts `(error, description)` from RFC 6749 or OAuth 1.0a problem-reporting fields.
fn provider_error(params: &ResponseParams) -> Option<(String, Option<String>)> {
	if let Some(error) = params.get("error") {
		let description = params.get_str("error_description").map(str::to_owned);

		return match error {
			Value::String(code) => Some((code.clone(), description)),
			Value::Object(inner) => {
				let message = inner.get("message").and_then(Value::as_str).map(str::to_owned);

				Some((error.to_string(), description.or(message)))
			},
			Value::Null => None,
			other => Some((other.to_string(), description)),
		};
	}

	params.get_str("oauth_problem").map(|problem| {
		(problem.to_owned(), params.get_str("oauth_problem_advice").map(str::to_owned))
	})
}

pub(crate) fn lossy(body: &[u8]) -> Cow<'_, str> {
	String::from_utf8_lossy(body)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	// self
	use super::*;

	fn headers(content_type: Option<&str>) -> HeaderMap {
		let mut headers = HeaderMap::new();

		if let Some(value) = content_type {
			headers.insert(CONTENT_TYPE, HeaderValue::from_str(value).expect("Valid header."));
		}

		headers
	}

	fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = StatusCode::from_u16(status).expect("Valid status.");
		*response.headers_mut() = headers(Some(content_type));

		response
	}

	#[test]
	fn form_and_json_normalize_to_same_ordered_map() {
		let form = parse_params(
			FlowKind::AccessToken,
			&headers(Some("application/x-www-form-urlencoded")),
			b"oauth_token=t&oauth_token_secret=s&user_id=42&screen_name=a+b",
		)
		.expect("Form body should parse.");
		let json = parse_params(
			FlowKind::AccessToken,
			&headers(Some("application/json; charset=utf-8")),
			br#"{"oauth_token":"t","oauth_token_secret":"s","user_id":"42","screen_name":"a b"}"#,
		)
		.expect("JSON body should parse.");

		assert_eq!(form, json);
		assert_eq!(
			form.iter().map(|(k, _)| k).collect::<Vec<_>>(),
			["oauth_token", "oauth_token_secret", "user_id", "screen_name"]
		);
	}

	#[test]
	fn content_type_is_authoritative() {
		// Declared form, even though it looks like JSON.
		let err = parse_params(FlowKind::AccessToken, &headers(Some("text/html")), b"{\"a\":1}")
			.expect_err("JSON-looking body without `=` is not a form document.");

		assert!(matches!(err, TokenExchangeError::NotAnObject { .. }));
		assert_eq!(
			BodyFormat::detect(&headers(Some("application/vnd.api+json")), b""),
			BodyFormat::Json
		);
		assert_eq!(BodyFormat::detect(&headers(None), b"  {\"a\":1}"), BodyFormat::Json);
		assert_eq!(BodyFormat::detect(&headers(None), b"a=1"), BodyFormat::Form);
	}

	#[test]
	fn malformed_json_reports_path() {
		let json = headers(Some("application/json"));
		let err = parse_params(FlowKind::AuthorizationCode, &json, b"{\"a\":")
			.expect_err("Truncated JSON must fail.");

		assert!(matches!(
			err,
			TokenExchangeError::MalformedJson { flow: FlowKind::AuthorizationCode, .. }
		));
		assert_eq!(err.payload(), "{\"a\":");

		let err = parse_params(FlowKind::AuthorizationCode, &json, b"[1]")
			.expect_err("Arrays are not key/value documents.");

		assert!(matches!(err, TokenExchangeError::NotAnObject { .. }));
	}

	#[test]
	fn take_str_preserves_remaining_order() {
		let mut params: ResponseParams =
			[("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();

		assert_eq!(params.take_str("a"), Some("1".into()));
		assert_eq!(params.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["b", "c"]);
	}

	#[test]
	fn provider_error_takes_precedence_over_status() {
		let ok_with_error = response(
			200,
			"application/json",
			r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
		);
		let err = token_response(FlowKind::AuthorizationCode, &ok_with_error)
			.expect_err("Error payload must fail even with HTTP 200.");

		match err {
			Error::TokenExchange(TokenExchangeError::Provider { error, description, status, .. }) => {
				assert_eq!(error, "bad_verification_code");
				assert_eq!(description.as_deref(), Some("The code passed is incorrect or expired."));
				assert_eq!(status, 200);
			},
			other => panic!("Unexpected error: {other:?}."),
		}

		let oauth1_problem =
			response(401, "application/x-www-form-urlencoded", "oauth_problem=signature_invalid");

		assert!(matches!(
			token_response(FlowKind::RequestToken, &oauth1_problem),
			Err(Error::TokenExchange(TokenExchangeError::Provider { status: 401, .. }))
		));
	}

	#[test]
	fn non_success_without_payload_is_transport_error() {
		let mut unavailable = response(503, "text/html", "<html>down</html>");

		unavailable.headers_mut().insert("retry-after", HeaderValue::from_static("7"));

		match token_response(FlowKind::Refresh, &unavailable) {
			Err(Error::Transport(TransportError::Status { status, retry_after, body })) => {
				assert_eq!(status, 503);
				assert_eq!(retry_after, Some(Duration::seconds(7)));
				assert_eq!(body, "<html>down</html>");
			},
			other => panic!("Unexpected result: {other:?}."),
		}
	}
}
