use std::io::Write;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::NormalizerConfig;
use crate::error::Error;
use crate::normalize::Normalizer;
use crate::normalize::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::types::EventDelivery;

/// One normalized event, ready for a log sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// When the record was built, not when the event happened.
    pub timestamp: DateTime<Utc>,
    pub source_id: String,
    pub event_name: String,
    pub slot: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub event_data: serde_json::Value,
}

pub trait RecordSink: Send + Sync {
    fn emit(&self, record: &EventRecord) -> Result<(), Error>;
}

/// Emits each record as an `info` event on the `vault_event` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecordSink {
    pub pretty: bool,
}

impl RecordSink for TracingRecordSink {
    fn emit(&self, record: &EventRecord) -> Result<(), Error> {
        let data = if self.pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };
        tracing::info!(
            target: "vault_event",
            event = %record.event_name,
            slot = record.slot,
            %data,
            "event received"
        );
        Ok(())
    }
}

/// Writes one JSON document per line.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn emit(&self, record: &EventRecord) -> Result<(), Error> {
        let mut writer = self.writer.lock().map_err(|_| Error::Sink {
            reason: "json lines writer lock poisoned".into(),
        })?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Normalizes delivered events and hands the resulting records to a sink.
///
/// Holds no per-event state, so one pipeline can serve every subscription
/// callback concurrently.
pub struct EventPipeline<R, D = TracingDiagnostics> {
    config: NormalizerConfig,
    records: R,
    diagnostics: D,
}

impl<R: RecordSink> EventPipeline<R> {
    pub fn new(config: NormalizerConfig, records: R) -> Self {
        Self::with_diagnostics(config, records, TracingDiagnostics)
    }
}

impl<R: RecordSink, D: DiagnosticSink> EventPipeline<R, D> {
    pub fn with_diagnostics(config: NormalizerConfig, records: R, diagnostics: D) -> Self {
        Self {
            config,
            records,
            diagnostics,
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn into_records(self) -> R {
        self.records
    }

    pub fn build_record(&self, delivery: &EventDelivery) -> EventRecord {
        self.build_record_at(delivery, Utc::now())
    }

    pub fn build_record_at(&self, delivery: &EventDelivery, timestamp: DateTime<Utc>) -> EventRecord {
        let normalizer =
            Normalizer::for_event(&self.config, &delivery.event_name, &self.diagnostics);
        EventRecord {
            timestamp,
            source_id: delivery.source_id.clone(),
            event_name: delivery.event_name.clone(),
            slot: delivery.slot,
            signature: delivery.signature.clone(),
            event_data: normalizer.normalize(&delivery.data),
        }
    }

    /// Builds and emits the record. Returns `Ok(None)` for events outside
    /// `subscribed_events`.
    pub fn handle(&self, delivery: &EventDelivery) -> Result<Option<EventRecord>, Error> {
        if !self.config.is_subscribed(&delivery.event_name) {
            tracing::debug!(
                event = %delivery.event_name,
                slot = delivery.slot,
                "skipping unsubscribed event"
            );
            return Ok(None);
        }

        let record = self.build_record(delivery);
        self.records.emit(&record)?;
        Ok(Some(record))
    }
}
