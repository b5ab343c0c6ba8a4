//! Optional observability helpers for handshake flows and signed requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth_handshake.flow` with the `flow`
//!   (protocol step) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `oauth_handshake_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `oauth_handshake_provider_response_total` counter labeled by status `class`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Protocol steps observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// OAuth 1.0a temporary credential request.
	RequestToken,
	/// OAuth 1.0a token credential exchange.
	AccessToken,
	/// OAuth 2.0 authorization code exchange.
	AuthorizationCode,
	/// OAuth 2.0 refresh token exchange.
	Refresh,
	/// Authenticated API request built for the caller.
	SignedRequest,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::RequestToken => "request_token",
			FlowKind::AccessToken => "access_token",
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::SignedRequest => "signed_request",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a [`FlowSpan`], recording the attempt and its outcome.
pub(crate) async fn observe<F, T>(kind: FlowKind, stage: &'static str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	record_result(kind, result)
}

/// Records the outcome of `result` and hands it back untouched.
pub(crate) fn record_result<T>(kind: FlowKind, result: Result<T>) -> Result<T> {
	let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

	record_flow_outcome(kind, outcome);

	result
}
