#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod config;
pub mod decimal;
pub mod error;
pub mod events;
pub mod normalize;
pub mod record;
pub mod types;

pub use config::{NormalizerConfig, OverflowPolicy};
pub use decimal::{DecimalValue, decode};
pub use error::Error;
pub use events::{DECIMAL_FRACTIONAL_BITS, SUPPRESSED_PREFIXES, VAULT_DECIMAL_FIELDS, VaultEvent};
pub use normalize::diagnostics::{
    CollectingDiagnostics, Diagnostic, DiagnosticSink, TracingDiagnostics,
};
pub use normalize::{FieldClass, Normalizer, normalize};
pub use record::{EventPipeline, EventRecord, JsonLinesSink, RecordSink, TracingRecordSink};
pub use types::{EventDelivery, PublicKey, RawEventValue};
