/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Diagnostics bus for the audio arbitration core.
//!
//! The coordinator publishes one [`DiagEvent`] per suspend, release and anomaly.
//! Anything interested (a dashboard, a CLI, a test) calls [`subscribe`] and drains
//! the channel. Publishing never blocks: when the bus is full the oldest queued
//! event makes room for the new one.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Number of events buffered before the oldest ones are discarded.
pub const BUS_CAPACITY: usize = 1024;

// === Diagnostic data structures ===

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagEvent {
    /// Sub-system that produced this event (e.g. "registry", "arbiter").
    pub subsystem: &'static str,
    /// Peer the event refers to, if any.
    pub peer_id: Option<String>,
    /// Unix time in milliseconds when the metric was captured.
    pub ts_ms: u64,
    pub metrics: Vec<Metric>,
}

impl DiagEvent {
    pub fn new(subsystem: &'static str, peer_id: Option<String>, metrics: Vec<Metric>) -> Self {
        Self {
            subsystem,
            peer_id,
            ts_ms: now_ms(),
            metrics,
        }
    }

    /// Look up a metric by name.
    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: MetricValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum MetricValue {
    I64(i64),
    U64(u64),
    Bool(bool),
    Text(String),
}

// === Global bus (flume multi-producer multi-consumer) ===

use flume::{Receiver, Sender};

static BUS: Lazy<(Sender<DiagEvent>, Receiver<DiagEvent>)> =
    Lazy::new(|| flume::bounded(BUS_CAPACITY));

/// Obtain a sender that can publish diagnostics events.
pub fn global_sender() -> &'static Sender<DiagEvent> {
    &BUS.0
}

/// Subscribe to the diagnostics stream.
///
/// Receivers share one queue, so each event is delivered to exactly one of them.
pub fn subscribe() -> Receiver<DiagEvent> {
    BUS.1.clone()
}

/// Publish an event. When the bus is full the oldest queued event is
/// discarded so the newest one is always kept.
///
/// Returns `false` when the event could not be queued.
pub fn publish(event: DiagEvent) -> bool {
    #[cfg(feature = "diagnostics")]
    {
        match global_sender().try_send(event) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(event)) => {
                let _ = BUS.1.try_recv();
                global_sender().try_send(event).is_ok()
            }
            Err(flume::TrySendError::Disconnected(_)) => false,
        }
    }
    #[cfg(not(feature = "diagnostics"))]
    {
        let _ = event;
        false
    }
}

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// === metric! helper macro ===

/// Shorthand for constructing a [`Metric`].
#[macro_export]
macro_rules! metric {
    ($name:expr, $value:expr) => {
        $crate::Metric {
            name: $name,
            value: $crate::MetricValue::from($value),
        }
    };
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::I64(v)
    }
}
impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::U64(v)
    }
}
impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}
impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}
impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_macro_conversions() {
        let m = metric!("suspended", true);
        assert_eq!(m.value, MetricValue::Bool(true));
        let m = metric!("reason", "voice_call");
        assert_eq!(m.value, MetricValue::Text("voice_call".to_string()));
        let m = metric!("elapsed_ms", 42u64);
        assert_eq!(m.value, MetricValue::U64(42));
    }

    #[test]
    fn test_metric_lookup_by_name() {
        let event = DiagEvent::new(
            "arbiter",
            Some("AA:BB:CC:DD:EE:01".to_string()),
            vec![metric!("suspended", true), metric!("wait", "must_wait")],
        );
        assert_eq!(event.metric("suspended"), Some(&MetricValue::Bool(true)));
        assert!(event.metric("missing").is_none());
        assert!(event.ts_ms > 0);
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn test_full_bus_keeps_newest_events() {
        let rx = subscribe();
        for i in 0..(BUS_CAPACITY as u64 + 100) {
            assert!(publish(DiagEvent::new(
                "registry",
                None,
                vec![metric!("seq", i)]
            )));
        }
        assert!(publish(DiagEvent::new(
            "arbiter",
            None,
            vec![metric!("stuck", true)]
        )));

        let drained: Vec<DiagEvent> = rx.try_iter().collect();
        assert_eq!(drained.len(), BUS_CAPACITY);
        assert_eq!(
            drained[0].metric("seq"),
            Some(&MetricValue::U64(101))
        );
        let last = drained.last().unwrap();
        assert_eq!(last.subsystem, "arbiter");
        assert_eq!(last.metric("stuck"), Some(&MetricValue::Bool(true)));
    }

    #[test]
    fn test_metric_value_serializes_tagged() {
        let json = serde_json::to_string(&MetricValue::U64(7)).unwrap();
        assert_eq!(json, r#"{"t":"U64","v":7}"#);
    }
}
