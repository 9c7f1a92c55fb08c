// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redundant, file-backed copy of every envelope.
//!
//! The mirror is a plain JSON array rewritten on each append. It has its own
//! ordering and no reference to record-store ids; the two logs are independent
//! sinks and may disagree after a crash between the two writes.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::json_file::JsonArrayFile;
use super::StorageResult;
use crate::crypto::Envelope;

/// One mirrored envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEntry {
    pub encrypted_data: Envelope,
    pub encrypted_at: DateTime<Utc>,
}

impl MirrorEntry {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            encrypted_data: envelope,
            encrypted_at: Utc::now(),
        }
    }
}

/// Append-only JSON array of [`MirrorEntry`].
pub struct MirrorStore {
    file: JsonArrayFile,
    write_lock: Mutex<()>,
}

impl MirrorStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonArrayFile::new(path),
            write_lock: Mutex::new(()),
        }
    }

    /// Read the full sequence, push `entry`, write it all back.
    pub fn append(&self, entry: MirrorEntry) -> StorageResult<usize> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<MirrorEntry> = self.file.load()?;
        entries.push(entry);
        self.file.store(&entries)?;
        Ok(entries.len())
    }

    pub fn entries(&self) -> StorageResult<Vec<MirrorEntry>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.file.load()
    }
}
