// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Survey submission flow.
//!
//! ```text
//! Received → Encoded → Stored → MirrorAttempted → Acknowledged
//!     │          │        │
//!     └──────────┴────────┴──→ Failed
//! ```
//!
//! A record-store failure fails the submission. The mirror hand-off never
//! does: it is fire-and-forget and its outcome is only reported.

use std::sync::Arc;

use tracing::{info, warn};

use super::{has_identifying_field, IDENTIFYING_FIELD};
use crate::crypto::{CodecError, EnvelopeCodec, SurveyRecord};
use crate::mirror_writer::{MirrorHandle, MirrorOutcome};
use crate::storage::{MirrorEntry, RecordStore, StorageError};

/// Where a submission is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Received,
    Encoded,
    Stored,
    MirrorAttempted,
    Acknowledged,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Encoding(#[from] CodecError),

    #[error("failed to store submission: {0}")]
    Storage(#[from] StorageError),
}

/// Result of an acknowledged submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub id: u64,
    pub mirror: MirrorOutcome,
    pub stage: SubmissionStage,
}

#[derive(Clone)]
pub struct SubmissionService {
    codec: Arc<EnvelopeCodec>,
    records: Arc<RecordStore>,
    mirror: MirrorHandle,
}

impl SubmissionService {
    pub fn new(codec: Arc<EnvelopeCodec>, records: Arc<RecordStore>, mirror: MirrorHandle) -> Self {
        Self {
            codec,
            records,
            mirror,
        }
    }

    /// Encrypt and persist one survey record.
    pub async fn submit(&self, record: SurveyRecord) -> Result<SubmissionReceipt, SubmissionError> {
        let mut stage = SubmissionStage::Received;

        if !has_identifying_field(&record) {
            warn!(stage = ?SubmissionStage::Failed, "Survey submission rejected: missing {IDENTIFYING_FIELD}");
            return Err(SubmissionError::Validation(format!(
                "Field '{IDENTIFYING_FIELD}' is required"
            )));
        }

        let envelope = self.codec.encode(&record).map_err(|e| {
            warn!(from = ?stage, stage = ?SubmissionStage::Failed, error = %e, "Survey encoding failed");
            SubmissionError::from(e)
        })?;
        drop(record);
        stage = SubmissionStage::Encoded;

        let records = Arc::clone(&self.records);
        let stored = envelope.clone();
        let id = tokio::task::spawn_blocking(move || records.append(&stored))
            .await
            .map_err(StorageError::from)
            .and_then(|result| result)
            .map_err(|e| {
                warn!(from = ?stage, stage = ?SubmissionStage::Failed, error = %e, "Survey record store write failed");
                SubmissionError::from(e)
            })?;
        stage = SubmissionStage::Stored;

        let mirror = self.mirror.enqueue(MirrorEntry::new(envelope));
        if mirror == MirrorOutcome::Dropped {
            warn!(record_id = id, from = ?stage, "Survey mirror hand-off dropped");
        }
        stage = SubmissionStage::MirrorAttempted;

        info!(record_id = id, mirror = ?mirror, from = ?stage, "Survey submission acknowledged");
        Ok(SubmissionReceipt {
            id,
            mirror,
            stage: SubmissionStage::Acknowledged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EnvelopeKey;
    use crate::mirror_writer::mirror_channel;
    use crate::storage::{ListLimit, MirrorStore};
    use serde_json::json;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    struct Fixture {
        _temp: TempDir,
        codec: Arc<EnvelopeCodec>,
        records: Arc<RecordStore>,
        mirror: Arc<MirrorStore>,
        service: SubmissionService,
        writer: Option<crate::mirror_writer::MirrorWriter>,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let codec = Arc::new(EnvelopeCodec::new(&EnvelopeKey::from_bytes([9u8; 32])).unwrap());
        let records = Arc::new(RecordStore::open(&temp.path().join("survey.redb")).unwrap());
        let mirror = Arc::new(MirrorStore::new(temp.path().join("mirror.json")));
        let (handle, writer) = mirror_channel(Arc::clone(&mirror), 8);
        let service = SubmissionService::new(Arc::clone(&codec), Arc::clone(&records), handle);
        Fixture {
            _temp: temp,
            codec,
            records,
            mirror,
            service,
            writer: Some(writer),
        }
    }

    fn record(value: serde_json::Value) -> SurveyRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn submit_stores_envelope_and_mirrors_it() {
        let mut fx = fixture();
        let receipt = fx
            .service
            .submit(record(json!({"name": "Ann", "email": "a@x.com"})))
            .await
            .unwrap();

        assert_eq!(receipt.id, 1);
        assert_eq!(receipt.stage, SubmissionStage::Acknowledged);
        assert_eq!(receipt.mirror, MirrorOutcome::Queued);

        let rows = fx.records.list_recent(ListLimit::default()).unwrap();
        assert_eq!(rows.len(), 1);
        let stored = rows[0].as_ref().unwrap();
        let decoded = fx.codec.decode_str(&stored.encrypted_data).unwrap();
        assert_eq!(decoded["name"], "Ann");

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        fx.writer.take().unwrap().run(shutdown).await;
        let mirrored = fx.mirror.entries().unwrap();
        assert_eq!(mirrored.len(), 1);
        assert_eq!(
            fx.codec.decode(&mirrored[0].encrypted_data).unwrap(),
            decoded
        );
    }

    #[tokio::test]
    async fn missing_name_is_rejected_before_any_write() {
        let fx = fixture();
        for bad in [json!({"email": "a@x.com"}), json!({"name": "  "}), json!({"name": 7})] {
            let err = fx.service.submit(record(bad)).await.unwrap_err();
            assert!(matches!(err, SubmissionError::Validation(_)));
        }
        assert_eq!(fx.records.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn mirror_outage_does_not_fail_submission() {
        let mut fx = fixture();
        drop(fx.writer.take());

        let receipt = fx
            .service
            .submit(record(json!({"name": "Ann"})))
            .await
            .unwrap();
        assert_eq!(receipt.mirror, MirrorOutcome::Dropped);
        assert_eq!(fx.records.count().unwrap(), 1);
    }
}
