// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the admin bearer token.
//!
//! ```rust,ignore
//! async fn list_surveys(_admin: AdminOnly, State(state): State<AppState>) { ... }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AuthError;
use crate::state::AppState;

/// Proof that the request carried the configured admin token.
#[derive(Debug)]
pub struct AdminOnly;

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        if !state.admin_token.verify(token) {
            tracing::warn!("Rejected admin request with invalid token");
            return Err(AuthError::InvalidToken);
        }

        Ok(AdminOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{test_state, TEST_ADMIN_TOKEN};
    use axum::http::Request;

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/surveys");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn requires_auth_header() {
        let (state, _temp) = test_state();
        let result = AdminOnly::from_request_parts(&mut parts(None), &state).await;
        assert_eq!(result.unwrap_err(), AuthError::MissingAuthHeader);
    }

    #[tokio::test]
    async fn requires_bearer_scheme() {
        let (state, _temp) = test_state();
        let header = format!("Basic {TEST_ADMIN_TOKEN}");
        let result = AdminOnly::from_request_parts(&mut parts(Some(&header)), &state).await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidAuthHeader);
    }

    #[tokio::test]
    async fn rejects_wrong_token() {
        let (state, _temp) = test_state();
        let result =
            AdminOnly::from_request_parts(&mut parts(Some("Bearer not-the-admin-token")), &state)
                .await;
        assert_eq!(result.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn accepts_configured_token() {
        let (state, _temp) = test_state();
        let header = format!("Bearer {TEST_ADMIN_TOKEN}");
        let result = AdminOnly::from_request_parts(&mut parts(Some(&header)), &state).await;
        assert!(result.is_ok());
    }
}
