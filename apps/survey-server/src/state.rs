// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AdminToken;
use crate::crypto::{CodecError, CredentialHasher, EnvelopeCodec, EnvelopeKey};
use crate::mirror_writer::{mirror_channel, MirrorWriter, DEFAULT_QUEUE_CAPACITY};
use crate::service::{AccountService, RetrievalService, SubmissionService};
use crate::storage::{DirectoryStore, MirrorStore, RecordStore, StorageError, StoragePaths};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to initialise cipher: {0}")]
    Codec(#[from] CodecError),

    #[error("failed to open storage: {0}")]
    Storage(#[from] StorageError),
}

/// Shared handler state. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub submissions: SubmissionService,
    pub retrieval: RetrievalService,
    pub accounts: AccountService,
    pub records: Arc<RecordStore>,
    pub paths: StoragePaths,
    pub admin_token: Arc<AdminToken>,
}

impl AppState {
    /// Open every store under `paths` and wire up the services.
    ///
    /// The returned [`MirrorWriter`] must be spawned by the caller; until it
    /// runs, mirror entries only accumulate in its queue.
    pub fn build(
        paths: StoragePaths,
        key: &EnvelopeKey,
        admin_token: AdminToken,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Result<(Self, MirrorWriter), StartupError> {
        let codec = Arc::new(EnvelopeCodec::new(key)?);
        let records = Arc::new(RecordStore::open(&paths.database_file())?);
        let mirror = Arc::new(MirrorStore::new(paths.mirror_file()));
        let directory = Arc::new(DirectoryStore::new(paths.directory_file()));

        let (mirror_handle, writer) = mirror_channel(mirror, DEFAULT_QUEUE_CAPACITY);

        let state = Self {
            submissions: SubmissionService::new(
                Arc::clone(&codec),
                Arc::clone(&records),
                mirror_handle,
            ),
            retrieval: RetrievalService::new(codec, Arc::clone(&records)),
            accounts: AccountService::new(directory, hasher),
            records,
            paths,
            admin_token: Arc::new(admin_token),
        };

        Ok((state, writer))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::crypto::Argon2Hasher;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    pub(crate) const TEST_ADMIN_TOKEN: &str = "test-admin-token-0123456789";

    /// State over a fresh temp directory with its mirror writer running.
    ///
    /// Must be called from inside a Tokio runtime.
    pub(crate) fn test_state() -> (AppState, TempDir) {
        let temp = TempDir::new().unwrap();
        let (state, writer) = AppState::build(
            StoragePaths::new(temp.path()),
            &EnvelopeKey::from_bytes([11u8; 32]),
            AdminToken::new(TEST_ADMIN_TOKEN).unwrap(),
            Arc::new(Argon2Hasher::low_cost()),
        )
        .unwrap();
        // Exits once the last state clone is dropped.
        tokio::spawn(writer.run(CancellationToken::new()));
        (state, temp)
    }
}
