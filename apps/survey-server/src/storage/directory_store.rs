// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account directory kept in a single JSON file.
//!
//! Every operation is read-whole → mutate → write-whole under one mutex per
//! store instance, so two concurrent signups for the same email cannot both
//! pass the uniqueness scan. Emails compare case-insensitively (after
//! trimming and NFKC normalization) but are stored as submitted.
//!
//! Known limitation: the lock is in-process only. Two server processes
//! sharing one data directory can still lose updates.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::json_file::JsonArrayFile;
use super::{StorageError, StorageResult};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub email: String,
    /// Opaque digest produced by the credential hasher.
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_digest: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into().trim().to_string(),
            password_digest: password_digest.into(),
            created_at: Utc::now(),
        }
    }

    fn email_key(&self) -> String {
        email_key(&self.email)
    }
}

/// Comparison key for an email address.
pub fn email_key(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Flat-file set of [`UserAccount`] keyed by email.
pub struct DirectoryStore {
    file: JsonArrayFile,
    lock: Mutex<()>,
}

impl DirectoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: JsonArrayFile::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Add an account unless one with the same email already exists.
    pub fn add(&self, account: UserAccount) -> StorageResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut accounts: Vec<UserAccount> = self.file.load()?;

        let key = account.email_key();
        if accounts.iter().any(|existing| existing.email_key() == key) {
            return Err(StorageError::DuplicateEmail(account.email));
        }

        accounts.push(account);
        self.file.store(&accounts)
    }

    /// Case-insensitive lookup by email.
    pub fn find(&self, email: &str) -> StorageResult<Option<UserAccount>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let key = email_key(email);
        let accounts: Vec<UserAccount> = self.file.load()?;
        Ok(accounts.into_iter().find(|account| account.email_key() == key))
    }

    /// Remove the first account matching `email` and return it.
    pub fn remove(&self, email: &str) -> StorageResult<UserAccount> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let key = email_key(email);
        let mut accounts: Vec<UserAccount> = self.file.load()?;

        let index = accounts
            .iter()
            .position(|account| account.email_key() == key)
            .ok_or_else(|| StorageError::NotFound(format!("User {}", email.trim())))?;
        let removed = accounts.remove(index);

        self.file.store(&accounts)?;
        Ok(removed)
    }
}
