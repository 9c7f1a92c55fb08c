// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::ApiError,
    models::{
        DeleteUserRequest, DeleteUserResponse, ErrorResponse, LoginRequest, SignupRequest,
        UserResponse,
    },
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    tag = "Users",
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Missing fields, short password, or email taken", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = payload?;
    let username = state
        .accounts
        .signup(&request.username, &request.email, &request.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            username,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    tag = "Users",
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Unknown email or wrong password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    let username = state.accounts.login(&request.email, &request.password).await?;
    Ok(Json(UserResponse {
        success: true,
        username,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/user",
    request_body = DeleteUserRequest,
    tag = "Users",
    responses(
        (status = 200, body = DeleteUserResponse),
        (status = 404, description = "No account with that email", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let Json(request) = payload?;
    let username = state.accounts.delete(&request.email).await?;
    Ok(Json(DeleteUserResponse {
        success: true,
        message: format!("User {username} deleted"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;

    fn signup_body(username: &str, email: &str, password: &str) -> Result<Json<SignupRequest>, JsonRejection> {
        Ok(Json(SignupRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }))
    }

    fn login_body(email: &str, password: &str) -> Result<Json<LoginRequest>, JsonRejection> {
        Ok(Json(LoginRequest {
            email: email.into(),
            password: password.into(),
        }))
    }

    #[tokio::test]
    async fn signup_login_delete_lifecycle() {
        let (state, _temp) = test_state();

        let (status, Json(created)) = signup(State(state.clone()), signup_body("bob", "B@X.com", "secret1"))
            .await
            .expect("signup succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.username, "bob");

        let Json(logged_in) = login(State(state.clone()), login_body("b@x.com", "secret1"))
            .await
            .expect("login succeeds");
        assert_eq!(logged_in.username, "bob");

        let Json(deleted) = delete_user(
            State(state.clone()),
            Ok(Json(DeleteUserRequest {
                email: "b@x.COM".into(),
            })),
        )
        .await
        .unwrap();
        assert!(deleted.success);
        assert_eq!(deleted.message, "User bob deleted");

        let err = login(State(state), login_body("b@x.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn short_password_and_duplicates_are_bad_requests() {
        let (state, _temp) = test_state();

        let err = signup(State(state.clone()), signup_body("bob", "b@x.com", "abc"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let (status, _) = signup(State(state.clone()), signup_body("bob", "b@x.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let err = signup(State(state), signup_body("robert", "B@X.COM", "secret2"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Email already registered");
    }

    #[tokio::test]
    async fn login_failures_look_the_same() {
        let (state, _temp) = test_state();
        let (status, _) = signup(State(state.clone()), signup_body("bob", "b@x.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let wrong_password = login(State(state.clone()), login_body("b@x.com", "secret2"))
            .await
            .unwrap_err();
        let unknown_email = login(State(state), login_body("nobody@x.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.message, unknown_email.message);
    }

    #[tokio::test]
    async fn deleting_unknown_user_is_not_found() {
        let (state, _temp) = test_state();
        let err = delete_user(
            State(state),
            Ok(Json(DeleteUserRequest {
                email: "ghost@x.com".into(),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
