// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin read path: newest responses, decrypted.
//!
//! Rows that fail to decode, or decode to a record without the identifying
//! field, are left out of the listing. They are never silently lost: the
//! listing carries a `dropped` count and a warning is logged.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::has_identifying_field;
use crate::crypto::{EnvelopeCodec, SurveyRecord};
use crate::storage::{ListLimit, RecentRow, RecordStore, StorageError, StorageResult};

/// A decrypted response with its store metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DecryptedResponse {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub record: SurveyRecord,
}

impl DecryptedResponse {
    /// Flatten into one JSON object. Store metadata wins over record fields
    /// of the same name.
    pub fn into_row(self) -> Map<String, Value> {
        let mut row = self.record;
        row.insert("id".to_string(), Value::from(self.id));
        row.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        row
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyListing {
    pub rows: Vec<DecryptedResponse>,
    pub dropped: usize,
}

#[derive(Clone)]
pub struct RetrievalService {
    codec: Arc<EnvelopeCodec>,
    records: Arc<RecordStore>,
}

impl RetrievalService {
    pub fn new(codec: Arc<EnvelopeCodec>, records: Arc<RecordStore>) -> Self {
        Self { codec, records }
    }

    pub async fn list(&self, limit: ListLimit) -> StorageResult<SurveyListing> {
        let records = Arc::clone(&self.records);
        let stored = tokio::task::spawn_blocking(move || records.list_recent(limit))
            .await
            .map_err(StorageError::from)??;

        Ok(decode_rows(&self.codec, stored))
    }
}

/// Decrypt listing rows, counting the ones that cannot be shown.
///
/// A row is dropped when its stored bytes are damaged, its envelope fails to
/// open, or the record lacks the identifying field.
pub fn decode_rows(codec: &EnvelopeCodec, rows: Vec<RecentRow>) -> SurveyListing {
    let mut listing = SurveyListing::default();
    for row in rows {
        let response = match row {
            Ok(response) => response,
            Err(damaged) => {
                debug!(record_id = damaged.id, reason = %damaged.reason, "Survey row is damaged");
                listing.dropped += 1;
                continue;
            }
        };
        match codec.decode_str(&response.encrypted_data) {
            Ok(record) if has_identifying_field(&record) => {
                listing.rows.push(DecryptedResponse {
                    id: response.id,
                    created_at: response.created_at,
                    record,
                });
            }
            Ok(_) => {
                debug!(record_id = response.id, "Survey row lacks identifying field");
                listing.dropped += 1;
            }
            Err(e) => {
                debug!(record_id = response.id, error = %e, "Survey row failed to decode");
                listing.dropped += 1;
            }
        }
    }

    if listing.dropped > 0 {
        warn!(
            dropped = listing.dropped,
            returned = listing.rows.len(),
            "Survey listing omitted undecodable rows"
        );
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EnvelopeKey;
    use crate::storage::{DamagedRow, StoredResponse};
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<EnvelopeCodec>, Arc<RecordStore>, RetrievalService) {
        let temp = TempDir::new().unwrap();
        let codec = Arc::new(EnvelopeCodec::new(&EnvelopeKey::from_bytes([5u8; 32])).unwrap());
        let records = Arc::new(RecordStore::open(&temp.path().join("survey.redb")).unwrap());
        let service = RetrievalService::new(Arc::clone(&codec), Arc::clone(&records));
        (temp, codec, records, service)
    }

    fn store(codec: &EnvelopeCodec, records: &RecordStore, value: Value) {
        let record = value.as_object().cloned().unwrap();
        records.append(&codec.encode(&record).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn lists_decrypted_rows_newest_first() {
        let (_temp, codec, records, service) = setup();
        store(&codec, &records, json!({"name": "Ann", "email": "a@x.com"}));
        store(&codec, &records, json!({"name": "Bob"}));

        let listing = service.list(ListLimit::default()).await.unwrap();
        assert_eq!(listing.dropped, 0);
        let names: Vec<&str> = listing
            .rows
            .iter()
            .map(|r| r.record["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Bob", "Ann"]);
        assert_eq!(listing.rows[1].id, 1);
    }

    #[tokio::test]
    async fn undecodable_and_nameless_rows_are_counted() {
        let (_temp, codec, records, service) = setup();
        store(&codec, &records, json!({"name": "Ann"}));
        store(&codec, &records, json!({"email": "anon@x.com"}));

        let foreign = EnvelopeCodec::new(&EnvelopeKey::from_bytes([6u8; 32])).unwrap();
        store(&foreign, &records, json!({"name": "Mallory"}));

        let listing = service.list(ListLimit::default()).await.unwrap();
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0].record["name"], "Ann");
        assert_eq!(listing.dropped, 2);
    }

    #[tokio::test]
    async fn unreadable_stored_bytes_do_not_fail_the_listing() {
        let (_temp, codec, records, service) = setup();
        records.insert_raw(1, b"not json").unwrap();
        store(&codec, &records, json!({"name": "Ann"}));

        let listing = service.list(ListLimit::default()).await.unwrap();
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0].record["name"], "Ann");
        assert_eq!(listing.dropped, 1);
    }

    #[test]
    fn damaged_rows_are_counted_as_dropped() {
        let codec = EnvelopeCodec::new(&EnvelopeKey::from_bytes([5u8; 32])).unwrap();
        let mut record = SurveyRecord::new();
        record.insert("name".into(), json!("Ann"));
        let rows = vec![
            Ok(StoredResponse {
                id: 2,
                encrypted_data: codec.encode(&record).unwrap().to_string(),
                created_at: Utc::now(),
            }),
            Err(DamagedRow {
                id: 1,
                reason: "expected value at line 1 column 1".into(),
            }),
        ];

        let listing = decode_rows(&codec, rows);
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.rows[0].id, 2);
        assert_eq!(listing.dropped, 1);
    }

    #[tokio::test]
    async fn limit_applies_before_decoding() {
        let (_temp, codec, records, service) = setup();
        for i in 0..5 {
            store(&codec, &records, json!({"name": format!("n{i}")}));
        }
        let listing = service.list(ListLimit::new(2)).await.unwrap();
        let ids: Vec<u64> = listing.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[test]
    fn into_row_adds_metadata_over_record_fields() {
        let created_at = Utc::now();
        let response = DecryptedResponse {
            id: 42,
            created_at,
            record: json!({"name": "Ann", "id": "spoofed"})
                .as_object()
                .cloned()
                .unwrap(),
        };
        let row = response.into_row();
        assert_eq!(row["id"], 42);
        assert_eq!(row["name"], "Ann");
        assert_eq!(row["created_at"], created_at.to_rfc3339());
    }
}
