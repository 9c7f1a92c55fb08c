// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Offline listing of every stored response, for the `survey-view` binary.
//!
//! Opens the database read-only, decrypts with the configured key, and
//! prints newest first. Rows that cannot be shown are counted, the same way
//! the admin endpoint counts them.

use std::io::{self, Write};

use serde_json::Value;

use crate::config::ViewerConfig;
use crate::crypto::{CodecError, EnvelopeCodec};
use crate::service::{decode_rows, SurveyListing};
use crate::storage::{RecordReader, StorageError, StoragePaths};

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to initialise cipher: {0}")]
    Codec(#[from] CodecError),

    #[error("failed to read survey database: {0}")]
    Storage(#[from] StorageError),
}

/// Decrypt every response under the configured data directory.
pub fn load_all(config: &ViewerConfig) -> Result<SurveyListing, ViewError> {
    let codec = EnvelopeCodec::new(&config.encryption_key)?;
    let paths = StoragePaths::new(&config.data_dir);
    let reader = RecordReader::open(&paths.database_file())?;
    Ok(decode_rows(&codec, reader.list_all()?))
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Null => "N/A".to_string(),
        Value::String(s) if s.trim().is_empty() => "N/A".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

/// Print a listing in the plain-text report format.
pub fn render(listing: &SurveyListing, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "=== Survey Responses ===")?;
    writeln!(out)?;

    if listing.rows.is_empty() && listing.dropped == 0 {
        writeln!(out, "No survey responses found.")?;
        writeln!(out)?;
        return Ok(());
    }

    for (index, response) in listing.rows.iter().enumerate() {
        writeln!(out, "Response #{}:", index + 1)?;
        writeln!(out, "  ID: {}", response.id)?;
        for (key, value) in &response.record {
            writeln!(out, "  {key}: {}", field_text(value))?;
        }
        writeln!(out, "  Created: {}", response.created_at.to_rfc3339())?;
        writeln!(out, "---")?;
        writeln!(out)?;
    }

    writeln!(out, "Total responses: {}", listing.rows.len())?;
    if listing.dropped > 0 {
        writeln!(out, "Unreadable responses: {}", listing.dropped)?;
    }
    Ok(())
}
