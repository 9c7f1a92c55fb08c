// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # At-Rest Encryption
//!
//! Survey records never reach disk in plaintext. Every record is sealed into
//! an [`Envelope`] with AES-256-GCM before it is handed to either store.
//!
//! ## Envelope Format
//!
//! ```text
//! <hex(nonce, 12 bytes)>:<hex(ciphertext || tag, 16-byte tag)>
//! ```
//!
//! ## Key Provisioning
//!
//! A single 32-byte key is supplied through the environment at process start
//! (`SURVEY_ENCRYPTION_KEY`). There is no compiled-in fallback: a missing or
//! malformed key stops the server before it binds a socket.
//!
//! ## Credentials
//!
//! Account passwords are not encrypted, they are hashed. See [`password`].

pub mod codec;
pub mod envelope;
pub mod key;
pub mod password;

pub use codec::{CodecError, DecodingFailure, EnvelopeCodec, SurveyRecord};
pub use envelope::{Envelope, EnvelopeParseError, NONCE_LEN};
pub use key::{EnvelopeKey, KeyError, KEY_LEN};
pub use password::{Argon2Hasher, CredentialHasher, PasswordError};
