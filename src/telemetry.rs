//! Optional telemetry hook
//!
//! An embedding application can observe mapping calls by installing a
//! callback. The hook is zero-cost when disabled (one thread-local check),
//! sampling is counter-based for reproducibility, and a panicking callback
//! is swallowed: telemetry must never be able to break a mapping call.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};

use crate::types::{CanonicalType, ReasonCode};

/// One observed mapping operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    /// Operation name, e.g. `map_source_type`
    pub operation: String,
    /// Wall-clock computation time; 0 for cache hits
    pub duration_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_codes: Option<Vec<ReasonCode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_type: Option<CanonicalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

/// Callback invoked for sampled telemetry events
pub type TelemetryCallback = Box<dyn Fn(&TelemetryEvent)>;

struct TelemetrySink {
    callback: TelemetryCallback,
    every_nth: u64,
    counter: u64,
}

thread_local! {
    static SINK: RefCell<Option<TelemetrySink>> = const { RefCell::new(None) };
}

/// Install or remove the telemetry callback
///
/// `sampling_rate` is clamped to `(0, 1]` and converted to a fixed cadence:
/// every Nth event is reported, N = round(1/rate). Counter-based rather
/// than randomized so test runs are reproducible.
pub fn set_telemetry(callback: Option<TelemetryCallback>, sampling_rate: f64) {
    SINK.with(|sink| {
        *sink.borrow_mut() = callback.map(|cb| {
            let rate = sampling_rate.clamp(f64::MIN_POSITIVE, 1.0);
            TelemetrySink {
                callback: cb,
                every_nth: (1.0 / rate).round().max(1.0) as u64,
                counter: 0,
            }
        });
    });
}

/// True when a callback is installed
pub(crate) fn enabled() -> bool {
    SINK.with(|sink| sink.borrow().is_some())
}

/// Report an event through the installed callback, if sampled
pub(crate) fn record(event: TelemetryEvent) {
    SINK.with(|sink| {
        let mut sink = sink.borrow_mut();
        let Some(sink) = sink.as_mut() else {
            return;
        };
        sink.counter += 1;
        if sink.counter % sink.every_nth != 0 {
            return;
        }
        // Callback failures must not propagate into the mapping call.
        let callback = &sink.callback;
        let _ = catch_unwind(AssertUnwindSafe(|| callback(&event)));
    });
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn event() -> TelemetryEvent {
        TelemetryEvent {
            operation: "map_source_type".to_string(),
            duration_ms: 0.1,
            confidence: Some(1.0),
            reason_codes: Some(vec![ReasonCode::ExactMatch]),
            from_type: Some("integer".to_string()),
            to_type: Some(CanonicalType::Integer),
            cached: Some(false),
        }
    }

    #[test]
    fn test_disabled_by_default() {
        set_telemetry(None, 1.0);
        assert!(!enabled());
        record(event());
    }

    #[test]
    fn test_every_event_at_full_rate() {
        let seen = Rc::new(Cell::new(0u32));
        let captured = seen.clone();
        set_telemetry(
            Some(Box::new(move |_| captured.set(captured.get() + 1))),
            1.0,
        );
        for _ in 0..5 {
            record(event());
        }
        set_telemetry(None, 1.0);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn test_counter_based_sampling() {
        let seen = Rc::new(Cell::new(0u32));
        let captured = seen.clone();
        set_telemetry(
            Some(Box::new(move |_| captured.set(captured.get() + 1))),
            0.25,
        );
        for _ in 0..8 {
            record(event());
        }
        set_telemetry(None, 1.0);
        // Every 4th event: deterministic, not randomized
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_panicking_callback_is_swallowed() {
        let seen = Rc::new(Cell::new(0u32));
        let captured = seen.clone();
        set_telemetry(
            Some(Box::new(move |_| {
                captured.set(captured.get() + 1);
                panic!("sink failure");
            })),
            1.0,
        );
        record(event());
        record(event());
        set_telemetry(None, 1.0);
        assert_eq!(seen.get(), 2);
    }
}
