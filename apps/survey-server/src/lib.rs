// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Survey Server - Encrypted Survey Intake Service
//!
//! Survey responses are sealed with AES-256-GCM before they reach disk. Each
//! response lands in an append-only embedded database and, best effort, in a
//! redundant JSON mirror. An admin-only endpoint lists decrypted responses.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Admin bearer-token guard
//! - `config` - Environment configuration
//! - `crypto` - Envelope codec and password hashing
//! - `mirror_writer` - Background writer for the mirror file
//! - `service` - Submission, retrieval, and account workflows
//! - `storage` - Record store (redb), mirror, and user directory files
//! - `viewer` - Offline report behind the `survey-view` binary

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod mirror_writer;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;
pub mod viewer;
