// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup, login, and account removal over the directory store.
//!
//! Password hashing and directory rewrites are blocking work and run on the
//! blocking pool.

use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::crypto::{CredentialHasher, PasswordError};
use crate::storage::{DirectoryStore, StorageError, UserAccount};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hashed once and verified against when a login names no account, so both
/// failure paths pay for one verification.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

fn decoy_digest<'a>(
    hasher: &dyn CredentialHasher,
    cell: &'a OnceLock<String>,
) -> Result<&'a str, PasswordError> {
    if let Some(digest) = cell.get() {
        return Ok(digest);
    }
    let digest = hasher.hash(DECOY_PASSWORD)?;
    Ok(cell.get_or_init(|| digest))
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Storage(StorageError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<StorageError> for AccountError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::DuplicateEmail(_) => AccountError::DuplicateEmail,
            StorageError::NotFound(_) => AccountError::NotFound,
            other => AccountError::Storage(other),
        }
    }
}

impl From<tokio::task::JoinError> for AccountError {
    fn from(e: tokio::task::JoinError) -> Self {
        AccountError::Storage(StorageError::from(e))
    }
}

#[derive(Clone)]
pub struct AccountService {
    directory: Arc<DirectoryStore>,
    hasher: Arc<dyn CredentialHasher>,
    decoy: Arc<OnceLock<String>>,
}

impl AccountService {
    pub fn new(directory: Arc<DirectoryStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            directory,
            hasher,
            decoy: Arc::new(OnceLock::new()),
        }
    }

    /// Register a new account and return its username.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AccountError> {
        let username = username.trim().to_string();
        let email = email.trim().to_string();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AccountError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let directory = Arc::clone(&self.directory);
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let created = username.clone();
        tokio::task::spawn_blocking(move || -> Result<(), AccountError> {
            // Cheap pre-check so duplicates don't pay for a hash; add() re-checks under lock.
            if directory.find(&email)?.is_some() {
                return Err(AccountError::DuplicateEmail);
            }
            let digest = hasher.hash(&password)?;
            directory.add(UserAccount::new(created, email, digest))?;
            Ok(())
        })
        .await??;

        info!(username = %username, "Account created");
        Ok(username)
    }

    /// Check credentials and return the account's username.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AccountError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let directory = Arc::clone(&self.directory);
        let hasher = Arc::clone(&self.hasher);
        let decoy = Arc::clone(&self.decoy);
        let email = email.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || -> Result<String, AccountError> {
            let Some(account) = directory.find(&email)? else {
                let digest = decoy_digest(hasher.as_ref(), &decoy)?;
                hasher.verify(&password, digest)?;
                return Err(AccountError::InvalidCredentials);
            };
            if hasher.verify(&password, &account.password_digest)? {
                Ok(account.username)
            } else {
                Err(AccountError::InvalidCredentials)
            }
        })
        .await?
    }

    /// Hard-delete the account registered under `email`.
    pub async fn delete(&self, email: &str) -> Result<String, AccountError> {
        if email.trim().is_empty() {
            return Err(AccountError::Validation("Email is required".to_string()));
        }

        let directory = Arc::clone(&self.directory);
        let email = email.to_string();
        let removed = tokio::task::spawn_blocking(move || directory.remove(&email)).await??;

        info!(username = %removed.username, "Account deleted");
        Ok(removed.username)
    }
}
