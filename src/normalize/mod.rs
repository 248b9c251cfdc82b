//! Recursive event normalization.
//!
//! Turns a decoded [`RawEventValue`] tree into plain JSON: identifiers become
//! base58, fixed-point fields are decoded, padding is dropped and integers keep
//! full precision (as strings once they leave the safe range).

pub mod diagnostics;

use std::collections::BTreeSet;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde_json::{Map, Value};

use crate::config::NormalizerConfig;
use crate::decimal;
use crate::types::RawEventValue;
use diagnostics::{Diagnostic, DiagnosticSink, TracingDiagnostics};

/// How a struct field is treated, decided by its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Suppressed,
    Decimal,
    Ordinary,
}

pub struct Normalizer<'a> {
    config: &'a NormalizerConfig,
    decimal_fields: &'a BTreeSet<String>,
    diagnostics: &'a dyn DiagnosticSink,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        config: &'a NormalizerConfig,
        decimal_fields: &'a BTreeSet<String>,
        diagnostics: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            config,
            decimal_fields,
            diagnostics,
        }
    }

    /// Normalizer using the decimal field set configured for `event_name`.
    pub fn for_event(
        config: &'a NormalizerConfig,
        event_name: &str,
        diagnostics: &'a dyn DiagnosticSink,
    ) -> Self {
        Self::new(config, config.decimal_fields_for(event_name), diagnostics)
    }

    pub fn classify(&self, field: &str) -> FieldClass {
        if self.config.is_suppressed(field) {
            FieldClass::Suppressed
        } else if self.decimal_fields.contains(field) {
            FieldClass::Decimal
        } else {
            FieldClass::Ordinary
        }
    }

    pub fn normalize(&self, value: &RawEventValue) -> Value {
        self.normalize_node(value, None)
    }

    fn normalize_node(&self, value: &RawEventValue, field: Option<&str>) -> Value {
        match value {
            RawEventValue::Null => Value::Null,
            RawEventValue::Bool(b) => Value::Bool(*b),
            RawEventValue::String(s) => Value::String(s.clone()),
            RawEventValue::Number(n) => Value::Number(n.clone()),
            RawEventValue::Integer(v) => self.integer(v, field),
            RawEventValue::IntegerLiteral(v) => Value::String(v.to_string()),
            RawEventValue::PublicKey(key) => Value::String(key.to_base58()),
            RawEventValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.normalize_node(item, field))
                    .collect(),
            ),
            RawEventValue::Record(fields) => {
                let mut out = Map::new();
                for (name, child) in fields {
                    let normalized = match self.classify(name) {
                        FieldClass::Suppressed => continue,
                        FieldClass::Decimal => self.decimal_field(name, child),
                        FieldClass::Ordinary => self.normalize_node(child, Some(name)),
                    };
                    out.insert(name.clone(), normalized);
                }
                Value::Object(out)
            }
        }
    }

    fn decimal_field(&self, name: &str, value: &RawEventValue) -> Value {
        let RawEventValue::Integer(bits) = value else {
            if !matches!(value, RawEventValue::Null | RawEventValue::Number(_)) {
                self.diagnostics.report(Diagnostic::DecimalFieldMismatch {
                    field: name.to_string(),
                    found: value.kind(),
                });
            }
            return self.normalize_node(value, Some(name));
        };

        let decoded = decimal::decode(bits, self.config.fractional_bits, self.config.on_overflow);
        if !decoded.is_number() {
            self.diagnostics.report(Diagnostic::DecimalFallback {
                field: name.to_string(),
                bits: bits.to_string(),
                policy: self.config.on_overflow,
            });
        }
        decoded.to_json(self.config.max_safe_integer)
    }

    fn integer(&self, value: &BigInt, field: Option<&str>) -> Value {
        let within_safe_range = value
            .magnitude()
            .to_u64()
            .is_some_and(|m| m <= self.config.max_safe_integer);
        if within_safe_range {
            if let Some(v) = value.to_i64() {
                return Value::from(v);
            }
            if let Some(v) = value.to_u64() {
                return Value::from(v);
            }
        }

        self.diagnostics.report(Diagnostic::IntegerFallback {
            field: field.map(str::to_string),
            value: value.to_string(),
        });
        Value::String(value.to_string())
    }
}

/// Normalize with the default configuration, reporting diagnostics via `tracing`.
pub fn normalize(value: &RawEventValue, decimal_field_names: &BTreeSet<String>) -> Value {
    let config = NormalizerConfig::default();
    Normalizer::new(&config, decimal_field_names, &TracingDiagnostics).normalize(value)
}
