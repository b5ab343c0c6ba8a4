//! RFC 3986 percent-encoding used by OAuth 1.0a base strings, `Authorization` headers,
//! and OAuth 2.0 authorize URLs.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved set (`A-Z a-z 0-9 - . _ ~`).
const RFC3986_RESERVED: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `value`, emitting uppercase `%XX` for every byte outside the unreserved set.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, RFC3986_RESERVED).to_string()
}

/// Encodes each pair and joins them as `k=v&k=v` in the given order.
pub fn encode_pairs<'a, I>(pairs: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut buf = String::new();

	for (idx, (key, value)) in pairs.into_iter().enumerate() {
		if idx > 0 {
			buf.push('&');
		}

		buf.push_str(&percent_encode(key));
		buf.push('=');
		buf.push_str(&percent_encode(value));
	}

	buf
}
