use std::sync::{Mutex, PoisonError};

use crate::config::OverflowPolicy;

/// A degradation the normalizer recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A fixed-point field could not be represented exactly as an `f64`.
    DecimalFallback {
        field: String,
        bits: String,
        policy: OverflowPolicy,
    },
    /// An integer exceeded the safe range and was emitted as a string.
    IntegerFallback {
        field: Option<String>,
        value: String,
    },
    /// A decimal field held something other than an integer.
    DecimalFieldMismatch { field: String, found: &'static str },
}

impl Diagnostic {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::DecimalFallback { field, .. } | Self::DecimalFieldMismatch { field, .. } => {
                Some(field.as_str())
            }
            Self::IntegerFallback { field, .. } => field.as_deref(),
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::DecimalFallback {
                field,
                bits,
                policy,
            } => tracing::warn!(
                %field,
                %bits,
                %policy,
                "fixed-point value is not exactly representable as f64"
            ),
            Diagnostic::IntegerFallback { field, value } => tracing::warn!(
                field = field.as_deref().unwrap_or("<element>"),
                %value,
                "integer exceeds safe range, emitted as string"
            ),
            Diagnostic::DecimalFieldMismatch { field, found } => tracing::warn!(
                %field,
                found,
                "decimal field does not hold an integer, normalized as-is"
            ),
        }
    }
}

/// Keeps every diagnostic in memory; handy for assertions and batch reports.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}
