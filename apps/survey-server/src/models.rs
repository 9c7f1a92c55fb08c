// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `ToSchema` (or `IntoParams`) for OpenAPI
//! documentation.
//!
//! ## Model Categories
//!
//! - **Surveys**: Free-form submissions and the admin listing
//! - **Users**: Signup, login, and account removal

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Surveys
// =============================================================================

/// Arbitrary survey fields. Must be a JSON object carrying a `name` string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct SurveySubmission(pub Map<String, Value>);

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    /// Identifier assigned by the record store.
    pub id: u64,
}

/// Query string for `GET /api/surveys`.
///
/// `limit` is kept as text so that non-numeric values fall back to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SurveyQuery {
    /// Page size, clamped to 1..=200 (default 100).
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SurveyListResponse {
    pub success: bool,
    /// Decrypted records, newest first, each with `id` and `created_at`.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Map<String, Value>>,
    /// Rows skipped because they failed to decrypt or lacked a name.
    pub dropped: usize,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DeleteUserRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub success: bool,
    pub message: String,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
