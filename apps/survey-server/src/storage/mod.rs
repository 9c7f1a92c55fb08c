// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage
//!
//! Three independent stores live under the data directory (`DATA_DIR`):
//!
//! ```text
//! <DATA_DIR>/
//!   survey.redb          # Record Store: survey_responses(id, encrypted_data, created_at)
//!   survey_mirror.json   # Mirror Store: [{encrypted_data, encrypted_at}, ...]
//!   users.json           # Directory Store: [{username, email, password_digest, created_at}, ...]
//! ```
//!
//! ## Consistency
//!
//! - The record store is the source of truth for survey responses.
//! - The mirror is written best-effort after the record store. The two are
//!   not transactionally coordinated: a crash between the writes leaves one
//!   log with an entry the other lacks.
//! - Survey payloads in both stores are envelopes; plaintext never lands here.

pub mod directory_store;
pub mod error;
pub mod json_file;
pub mod mirror_store;
pub mod paths;
pub mod record_store;

pub use directory_store::{email_key, DirectoryStore, UserAccount};
pub use error::{StorageError, StorageResult};
pub use json_file::JsonArrayFile;
pub use mirror_store::{MirrorEntry, MirrorStore};
pub use paths::StoragePaths;
pub use record_store::{
    DamagedRow, ListLimit, RecentRow, RecordReader, RecordStore, StoredResponse,
};
