// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin bearer token.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Shortest admin token accepted at startup.
pub const MIN_ADMIN_TOKEN_LEN: usize = 16;

/// SHA-256 digest of the configured admin token.
#[derive(Clone)]
pub struct AdminToken {
    digest: [u8; 32],
}

impl AdminToken {
    /// Returns `None` when the token is shorter than [`MIN_ADMIN_TOKEN_LEN`].
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.chars().count() < MIN_ADMIN_TOKEN_LEN {
            return None;
        }
        Some(Self {
            digest: Sha256::digest(token.as_bytes()).into(),
        })
    }

    /// Check a presented token.
    pub fn verify(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.trim().as_bytes()).into();
        presented[..].ct_eq(&self.digest[..]).into()
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminToken([REDACTED])")
    }
}
