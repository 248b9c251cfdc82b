//! Normalizer configuration.
//!
//! Field classification is table driven: decimal fields are looked up per event
//! name and suppressed fields by prefix. Everything here is plain data so a
//! deployment can override it from JSON without touching code.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::decimal::MAX_FRACTIONAL_BITS;
use crate::error::Error;
use crate::events::{DECIMAL_FRACTIONAL_BITS, SUPPRESSED_PREFIXES, VAULT_DECIMAL_FIELDS};

/// What a fixed-point decode does when the quotient is not exactly
/// representable as an `f64`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum OverflowPolicy {
    /// Emit the exact quotient as a plain decimal string.
    #[default]
    FallbackString,
    /// Emit `null`, the JSON rendering of a `NaN` result.
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Fractional bits of the fixed-point encoding.
    #[serde(default = "default_fractional_bits")]
    pub fractional_bits: u32,
    /// Decimal fields for events without an entry in `decimal_fields`.
    #[serde(default = "default_decimal_fields")]
    pub default_decimal_fields: BTreeSet<String>,
    /// event name → decimal field names; replaces the default set for that event
    #[serde(default)]
    pub decimal_fields: HashMap<String, BTreeSet<String>>,
    #[serde(default = "default_suppressed_prefixes")]
    pub suppressed_prefixes: Vec<String>,
    #[serde(default)]
    pub on_overflow: OverflowPolicy,
    /// Largest integer magnitude emitted as a JSON number. Defaults to the
    /// JavaScript safe-integer bound so downstream parsers never round.
    #[serde(default = "default_max_safe_integer")]
    pub max_safe_integer: u64,
    /// Event names to emit (empty = all)
    #[serde(default)]
    pub subscribed_events: BTreeSet<String>,
}

pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

fn default_fractional_bits() -> u32 {
    DECIMAL_FRACTIONAL_BITS
}

fn default_decimal_fields() -> BTreeSet<String> {
    VAULT_DECIMAL_FIELDS.iter().map(|s| (*s).to_string()).collect()
}

fn default_suppressed_prefixes() -> Vec<String> {
    SUPPRESSED_PREFIXES.iter().map(|s| (*s).to_string()).collect()
}

fn default_max_safe_integer() -> u64 {
    MAX_SAFE_INTEGER
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            fractional_bits: default_fractional_bits(),
            default_decimal_fields: default_decimal_fields(),
            decimal_fields: HashMap::new(),
            suppressed_prefixes: default_suppressed_prefixes(),
            on_overflow: OverflowPolicy::default(),
            max_safe_integer: default_max_safe_integer(),
            subscribed_events: BTreeSet::new(),
        }
    }
}

impl NormalizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.fractional_bits > MAX_FRACTIONAL_BITS {
            return Err(Error::Config {
                reason: format!(
                    "fractional_bits must be at most {MAX_FRACTIONAL_BITS}, got {}",
                    self.fractional_bits
                ),
            });
        }
        if let Some(empty) = self.suppressed_prefixes.iter().position(String::is_empty) {
            return Err(Error::Config {
                reason: format!("suppressed_prefixes[{empty}] is empty and would hide every field"),
            });
        }
        if self.max_safe_integer == 0 {
            return Err(Error::Config {
                reason: "max_safe_integer must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.on_overflow = policy;
        self
    }

    pub fn decimal_fields_for(&self, event_name: &str) -> &BTreeSet<String> {
        self.decimal_fields
            .get(event_name)
            .unwrap_or(&self.default_decimal_fields)
    }

    pub fn is_suppressed(&self, field: &str) -> bool {
        self.suppressed_prefixes
            .iter()
            .any(|prefix| field.starts_with(prefix.as_str()))
    }

    pub fn is_subscribed(&self, event_name: &str) -> bool {
        self.subscribed_events.is_empty() || self.subscribed_events.contains(event_name)
    }
}
