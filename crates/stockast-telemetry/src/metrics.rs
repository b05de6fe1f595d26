//! Upstream call metrics
//!
//! Instruments are created from the global meter provider, so they are
//! no-ops until [`crate::init`] installs an exporter.

use std::sync::OnceLock;
use std::time::Instant;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};

pub const UPSTREAM_REQUEST_DURATION: &str = "upstream.request.duration";
pub const UPSTREAM_REQUEST_COUNT: &str = "upstream.request.count";

struct Instruments {
    duration: Histogram<f64>,
    count: Counter<u64>,
}

fn instruments() -> &'static Instruments {
    static INSTRUMENTS: OnceLock<Instruments> = OnceLock::new();

    INSTRUMENTS.get_or_init(|| {
        let meter = opentelemetry::global::meter("stockast");
        Instruments {
            duration: meter
                .f64_histogram(UPSTREAM_REQUEST_DURATION)
                .with_unit("s")
                .with_description("Latency of calls to external services")
                .build(),
            count: meter
                .u64_counter(UPSTREAM_REQUEST_COUNT)
                .with_description("Calls to external services by outcome")
                .build(),
        }
    })
}

/// Outcome label for an upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Record one upstream call that started at `start`
pub fn record_upstream(upstream: &'static str, outcome: Outcome, start: Instant) {
    let attributes = [
        KeyValue::new("upstream", upstream),
        KeyValue::new("outcome", outcome.as_str()),
    ];

    let instruments = instruments();
    instruments.duration.record(start.elapsed().as_secs_f64(), &attributes);
    instruments.count.add(1, &attributes);
}

/// Record the outcome of an upstream call from its result
pub fn observe<T, E>(upstream: &'static str, start: Instant, result: &Result<T, E>) {
    let outcome = if result.is_ok() { Outcome::Success } else { Outcome::Failure };
    record_upstream(upstream, outcome, start);
}
