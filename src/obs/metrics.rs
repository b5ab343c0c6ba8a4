// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth_handshake_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts provider responses by status class (`2xx`, `4xx`, ...).
pub fn record_provider_status(status: u16) {
	let class = status_class(status);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth_handshake_provider_response_total", "class" => class).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = class;
	}
}

fn status_class(status: u16) -> &'static str {
	match status {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_without_metrics() {
		record_flow_outcome(FlowKind::RequestToken, FlowOutcome::Failure);
		record_flow_outcome(FlowKind::SignedRequest, FlowOutcome::Success);
		record_provider_status(429);
	}

	#[test]
	fn status_classes_cover_every_range() {
		assert_eq!(status_class(204), "2xx");
		assert_eq!(status_class(401), "4xx");
		assert_eq!(status_class(503), "5xx");
		assert_eq!(status_class(42), "other");
	}
}
