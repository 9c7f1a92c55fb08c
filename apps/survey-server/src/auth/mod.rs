// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Admin Authentication
//!
//! The decrypted survey listing is the only privileged endpoint. It is
//! guarded by a static bearer token supplied at startup
//! (`SURVEY_ADMIN_TOKEN`).
//!
//! ## Auth Flow
//!
//! 1. Operator sends `Authorization: Bearer <token>`
//! 2. Server hashes the presented token with SHA-256
//! 3. Digest is compared against the digest of the configured token
//!
//! Only the digest is kept in memory after startup.

pub mod error;
pub mod extractor;
pub mod token;

pub use error::AuthError;
pub use extractor::AdminOnly;
pub use token::{AdminToken, MIN_ADMIN_TOKEN_LEN};
