//! Validation events and the observers that receive them.
//!
//! The core never logs on its own: coercion, header checks and the row loop
//! report every branch to a [`ValidationObserver`] passed in by the caller.
//! [`TracingObserver`] forwards to `tracing` (a no-op until a subscriber is
//! installed), [`CollectingObserver`] keeps events in memory.

use serde::Serialize;
use std::cell::RefCell;

/// Log level for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Something the pipeline did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ValidationEvent {
    /// No value to coerce; the default was returned.
    CoerceMissing { default: Option<i64> },
    /// A raw value parsed to an integer.
    CoerceParsed { raw: String, parsed: i64 },
    /// A raw value did not parse.
    CoerceFailed { raw: String },
    /// The transform accepted a parsed value.
    CoerceTransformed { parsed: i64, transformed: i64 },
    /// The transform refused a parsed value.
    CoerceTransformFailed { parsed: i64, message: String },
    /// All required headers are present.
    HeadersPresent { required: usize, actual: usize },
    /// Some required headers are absent.
    HeadersMissing { missing: Vec<String> },
    RowAccepted { row: usize },
    RowRejected { row: usize, reason: String },
    /// The row loop finished.
    RunFinished {
        total: usize,
        accepted: usize,
        rejected: usize,
    },
}

impl ValidationEvent {
    pub fn level(&self) -> LogLevel {
        match self {
            Self::CoerceMissing { .. }
            | Self::CoerceParsed { .. }
            | Self::CoerceTransformed { .. }
            | Self::RowAccepted { .. } => LogLevel::Debug,
            Self::HeadersPresent { .. } | Self::RunFinished { .. } => LogLevel::Info,
            Self::CoerceFailed { .. } | Self::RowRejected { .. } => LogLevel::Warning,
            Self::CoerceTransformFailed { .. } | Self::HeadersMissing { .. } => LogLevel::Error,
        }
    }
}

/// Receives events from the validation core.
pub trait ValidationObserver {
    fn observe(&self, event: &ValidationEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ValidationObserver for NoopObserver {
    fn observe(&self, _event: &ValidationEvent) {}
}

/// Emit a `tracing` event at a runtime [`LogLevel`].
macro_rules! emit {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Debug => tracing::debug!($($arg)+),
            LogLevel::Info => tracing::info!($($arg)+),
            LogLevel::Warning => tracing::warn!($($arg)+),
            LogLevel::Error => tracing::error!($($arg)+),
        }
    };
}

/// Emits each event as a structured `tracing` record at [`ValidationEvent::level`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ValidationObserver for TracingObserver {
    fn observe(&self, event: &ValidationEvent) {
        let level = event.level();
        match event {
            ValidationEvent::CoerceMissing { default } => {
                emit!(level, ?default, "coerce received no value, returning default");
            }
            ValidationEvent::CoerceParsed { raw, parsed } => {
                emit!(level, raw = %raw, parsed, "parsed value to int");
            }
            ValidationEvent::CoerceFailed { raw } => {
                emit!(level, raw = %raw, "failed to parse value to int");
            }
            ValidationEvent::CoerceTransformed { parsed, transformed } => {
                emit!(level, parsed, transformed, "transformed parsed int");
            }
            ValidationEvent::CoerceTransformFailed { parsed, message } => {
                emit!(level, parsed, error = %message, "transform rejected parsed int");
            }
            ValidationEvent::HeadersPresent { required, actual } => {
                emit!(level, required, actual, "all required headers are present");
            }
            ValidationEvent::HeadersMissing { missing } => {
                emit!(level, missing = %missing.join(", "), "missing required headers");
            }
            ValidationEvent::RowAccepted { row } => {
                emit!(level, row, "row validated");
            }
            ValidationEvent::RowRejected { row, reason } => {
                emit!(level, row, reason = %reason, "row rejected");
            }
            ValidationEvent::RunFinished {
                total,
                accepted,
                rejected,
            } => {
                emit!(level, total, accepted, rejected, "finished validation");
            }
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: RefCell<Vec<ValidationEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<ValidationEvent> {
        self.events.borrow().clone()
    }

    /// Events at or above `level`.
    pub fn at_least(&self, level: LogLevel) -> Vec<ValidationEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.level() >= level)
            .cloned()
            .collect()
    }
}

impl ValidationObserver for CollectingObserver {
    fn observe(&self, event: &ValidationEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
