// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the storage layout.

use std::path::{Path, PathBuf};

/// Default data directory when `DATA_DIR` is not set.
pub const DEFAULT_DATA_ROOT: &str = "./data";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Embedded database holding the `survey_responses` table.
    pub fn database_file(&self) -> PathBuf {
        self.root.join("survey.redb")
    }

    /// JSON array of mirrored envelopes.
    pub fn mirror_file(&self) -> PathBuf {
        self.root.join("survey_mirror.json")
    }

    /// JSON array of user accounts.
    pub fn directory_file(&self) -> PathBuf {
        self.root.join("users.json")
    }
}
