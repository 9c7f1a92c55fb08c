// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The serialized `(nonce, ciphertext)` pair stored for every survey record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = ring::aead::NONCE_LEN;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

const SEPARATOR: char = ':';

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnvelopeParseError {
    #[error("envelope is missing the ':' separator")]
    MissingSeparator,

    #[error("envelope {0} is not valid hex")]
    InvalidHex(&'static str),

    #[error("envelope nonce must be 12 bytes, got {0}")]
    NonceLength(usize),

    #[error("envelope ciphertext is shorter than the 16-byte tag")]
    Truncated,
}

/// One encrypted record.
///
/// The text form is `hex(nonce) ":" hex(ciphertext)`, where `ciphertext`
/// already carries the trailing authentication tag.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Envelope {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub(crate) fn new(nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>) -> Self {
        Self { nonce, ciphertext }
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            hex::encode(self.nonce),
            hex::encode(&self.ciphertext)
        )
    }
}

// Ciphertext is noise; print lengths only.
impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("nonce", &hex::encode(self.nonce))
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

impl FromStr for Envelope {
    type Err = EnvelopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (nonce_hex, ciphertext_hex) = s
            .trim()
            .split_once(SEPARATOR)
            .ok_or(EnvelopeParseError::MissingSeparator)?;

        let nonce = hex::decode(nonce_hex).map_err(|_| EnvelopeParseError::InvalidHex("nonce"))?;
        let nonce_len = nonce.len();
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| EnvelopeParseError::NonceLength(nonce_len))?;

        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|_| EnvelopeParseError::InvalidHex("ciphertext"))?;
        if ciphertext.len() < TAG_LEN {
            return Err(EnvelopeParseError::Truncated);
        }

        Ok(Self { nonce, ciphertext })
    }
}

impl TryFrom<String> for Envelope {
    type Error = EnvelopeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Envelope> for String {
    fn from(value: Envelope) -> Self {
        value.to_string()
    }
}
