// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Orchestration between the codec and the stores.
//!
//! - `submission` - encode → record store → mirror hand-off
//! - `retrieval` - record store → decode, with a count of dropped rows
//! - `accounts` - signup / login / delete over the directory store

pub mod accounts;
pub mod retrieval;
pub mod submission;

pub use accounts::{AccountError, AccountService, MIN_PASSWORD_LEN};
pub use retrieval::{decode_rows, DecryptedResponse, RetrievalService, SurveyListing};
pub use submission::{SubmissionError, SubmissionReceipt, SubmissionService, SubmissionStage};

/// Field every survey record must carry to be accepted or listed.
pub const IDENTIFYING_FIELD: &str = "name";

/// Whether `record` carries a non-blank string identifying field.
pub fn has_identifying_field(record: &crate::crypto::SurveyRecord) -> bool {
    record
        .get(IDENTIFYING_FIELD)
        .and_then(|value| value.as_str())
        .is_some_and(|name| !name.trim().is_empty())
}
