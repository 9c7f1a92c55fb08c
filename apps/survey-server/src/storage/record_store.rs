// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Append-only survey response log backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `survey_responses`: id (`u64`, monotonic from 1) → JSON
//!   `{"encrypted_data": "<envelope>", "created_at": "<RFC3339>"}`
//!
//! There is no update or delete path.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{
    Database, ReadOnlyDatabase, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition, TableError,
};
use serde::{Deserialize, Serialize};

use super::StorageResult;
use crate::crypto::Envelope;

const SURVEY_RESPONSES: TableDefinition<u64, &[u8]> = TableDefinition::new("survey_responses");

/// Row limit used when the caller gives none (or gives garbage).
pub const DEFAULT_LIST_LIMIT: usize = 100;
/// Smallest accepted row limit.
pub const MIN_LIST_LIMIT: usize = 1;
/// Largest accepted row limit.
pub const MAX_LIST_LIMIT: usize = 200;

/// A row limit already clamped into `[MIN_LIST_LIMIT, MAX_LIST_LIMIT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimit(usize);

impl ListLimit {
    pub fn new(requested: i64) -> Self {
        let clamped = requested.clamp(MIN_LIST_LIMIT as i64, MAX_LIST_LIMIT as i64);
        Self(clamped as usize)
    }

    /// Interpret a raw `?limit=` query value.
    ///
    /// Integers outside `i64` saturate before clamping; anything that is not
    /// an optionally signed run of digits falls back to the default.
    pub fn from_query(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::default();
        };
        let digits = raw.strip_prefix(&['+', '-'][..]).unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Self::default();
        }
        match raw.parse::<i64>() {
            Ok(n) => Self::new(n),
            Err(_) if raw.starts_with('-') => Self::new(i64::MIN),
            Err(_) => Self::new(i64::MAX),
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ListLimit {
    fn default() -> Self {
        Self(DEFAULT_LIST_LIMIT)
    }
}

/// One persisted response, still encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub id: u64,
    /// Envelope text as stored. Parsed lazily so a damaged envelope shows up
    /// as a decode failure for that row instead of failing the whole listing.
    pub encrypted_data: String,
    pub created_at: DateTime<Utc>,
}

/// A row whose stored bytes no longer parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamagedRow {
    pub id: u64,
    pub reason: String,
}

/// One listing entry: the stored response, or why its row is unreadable.
pub type RecentRow = Result<StoredResponse, DamagedRow>;

#[derive(Serialize, Deserialize)]
struct ResponseRow {
    encrypted_data: String,
    created_at: DateTime<Utc>,
}

fn parse_row(id: u64, bytes: &[u8]) -> RecentRow {
    match serde_json::from_slice::<ResponseRow>(bytes) {
        Ok(row) => Ok(StoredResponse {
            id,
            encrypted_data: row.encrypted_data,
            created_at: row.created_at,
        }),
        Err(e) => Err(DamagedRow {
            id,
            reason: e.to_string(),
        }),
    }
}

/// Newest-first walk over at most `take` rows.
fn read_recent(db: &impl ReadableDatabase, take: usize) -> StorageResult<Vec<RecentRow>> {
    let read_txn = db.begin_read()?;
    let table = match read_txn.open_table(SURVEY_RESPONSES) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut rows = Vec::new();
    for entry in table.iter()?.rev().take(take) {
        let (key, value) = entry?;
        rows.push(parse_row(key.value(), value.value()));
    }
    Ok(rows)
}

fn count_rows(db: &impl ReadableDatabase) -> StorageResult<u64> {
    let read_txn = db.begin_read()?;
    match read_txn.open_table(SURVEY_RESPONSES) {
        Ok(table) => Ok(table.len()?),
        Err(TableError::TableDoesNotExist(_)) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Primary, source-of-truth store for survey responses.
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SURVEY_RESPONSES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Persist an envelope under the next id and return that id.
    pub fn append(&self, envelope: &Envelope) -> StorageResult<u64> {
        self.append_at(envelope, Utc::now())
    }

    fn append_at(&self, envelope: &Envelope, created_at: DateTime<Utc>) -> StorageResult<u64> {
        let row = serde_json::to_vec(&ResponseRow {
            encrypted_data: envelope.to_string(),
            created_at,
        })?;

        let write_txn = self.db.begin_write()?;
        let id = {
            let mut table = write_txn.open_table(SURVEY_RESPONSES)?;
            let id = table.last()?.map(|(key, _)| key.value() + 1).unwrap_or(1);
            table.insert(id, row.as_slice())?;
            id
        };
        write_txn.commit()?;
        Ok(id)
    }

    /// Newest-first listing of at most `limit` responses.
    ///
    /// A row that cannot be parsed comes back as a [`DamagedRow`] in its
    /// position; only transaction or I/O failures fail the call.
    pub fn list_recent(&self, limit: ListLimit) -> StorageResult<Vec<RecentRow>> {
        read_recent(&self.db, limit.get())
    }

    /// Number of stored responses.
    pub fn count(&self) -> StorageResult<u64> {
        count_rows(&self.db)
    }

    /// Write arbitrary bytes under `id`, bypassing row encoding.
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, id: u64, bytes: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SURVEY_RESPONSES)?;
            table.insert(id, bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// Read-only view of the response log for offline inspection.
///
/// Opening takes a shared lock, so it fails while the server holds the file.
pub struct RecordReader {
    db: ReadOnlyDatabase,
}

impl RecordReader {
    pub fn open(path: &Path) -> StorageResult<Self> {
        let db = ReadOnlyDatabase::open(path)?;
        Ok(Self { db })
    }

    /// Every response, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<RecentRow>> {
        read_recent(&self.db, usize::MAX)
    }

    pub fn count(&self) -> StorageResult<u64> {
        count_rows(&self.db)
    }
}
