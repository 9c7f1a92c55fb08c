// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Envelope codec: survey record ⇄ sealed [`Envelope`].
//!
//! Records are serialized with `serde_json` (object keys come out sorted, so
//! the byte form is canonical), sealed with AES-256-GCM under a fresh random
//! nonce, and opened again with the same process-wide key. Opening verifies
//! the tag first, so a wrong key or a flipped byte is always an error.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::{Map, Value};

use super::envelope::{Envelope, EnvelopeParseError, NONCE_LEN};
use super::key::EnvelopeKey;

/// A survey submission: field name → value.
pub type SurveyRecord = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encoding failure: {0}")]
    EncodingFailure(String),

    #[error("decoding failure: {0}")]
    DecodingFailure(#[from] DecodingFailure),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodingFailure {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] EnvelopeParseError),

    /// Tag check failed: wrong key or tampered ciphertext.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("plaintext is not a survey record: {0}")]
    InvalidRecord(String),
}

/// Seals and opens survey records with a single static key.
pub struct EnvelopeCodec {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl EnvelopeCodec {
    pub fn new(key: &EnvelopeKey) -> Result<Self, CodecError> {
        let unbound = UnboundKey::new(&AES_256_GCM, key.as_bytes())
            .map_err(|_| CodecError::EncodingFailure("key rejected by cipher".to_string()))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Encrypt a record under a fresh nonce.
    pub fn encode(&self, record: &SurveyRecord) -> Result<Envelope, CodecError> {
        let mut in_out =
            serde_json::to_vec(record).map_err(|e| CodecError::EncodingFailure(e.to_string()))?;

        let mut nonce = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce)
            .map_err(|_| CodecError::EncodingFailure("nonce generation failed".to_string()))?;

        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| CodecError::EncodingFailure("seal failed".to_string()))?;

        Ok(Envelope::new(nonce, in_out))
    }

    /// Decrypt an envelope back into the record it was built from.
    pub fn decode(&self, envelope: &Envelope) -> Result<SurveyRecord, CodecError> {
        let mut in_out = envelope.ciphertext().to_vec();
        let plaintext = self
            .key
            .open_in_place(
                Nonce::assume_unique_for_key(*envelope.nonce()),
                Aad::empty(),
                &mut in_out,
            )
            .map_err(|_| DecodingFailure::AuthenticationFailed)?;

        let value: Value = serde_json::from_slice(plaintext)
            .map_err(|e| DecodingFailure::InvalidRecord(e.to_string()))?;
        match value {
            Value::Object(record) => Ok(record),
            other => Err(DecodingFailure::InvalidRecord(format!(
                "expected object, found {}",
                json_kind(&other)
            ))
            .into()),
        }
    }

    /// Parse the stored text form and decrypt it.
    pub fn decode_str(&self, stored: &str) -> Result<SurveyRecord, CodecError> {
        let envelope: Envelope = stored.parse().map_err(DecodingFailure::from)?;
        self.decode(&envelope)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
