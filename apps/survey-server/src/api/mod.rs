// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        DeleteUserRequest, DeleteUserResponse, ErrorResponse, LoginRequest, SignupRequest,
        SubmitResponse, SurveyListResponse, SurveySubmission, UserResponse,
    },
    state::AppState,
};

pub mod health;
pub mod surveys;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/submit", post(surveys::submit_survey))
        .route("/surveys", get(surveys::list_surveys))
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/user", delete(users::delete_user));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        surveys::submit_survey,
        surveys::list_surveys,
        users::signup,
        users::login,
        users::delete_user,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SurveySubmission,
            SubmitResponse,
            SurveyListResponse,
            SignupRequest,
            LoginRequest,
            DeleteUserRequest,
            UserResponse,
            DeleteUserResponse,
            ErrorResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Surveys", description = "Encrypted survey intake and admin listing"),
        (name = "Users", description = "Account signup, login, and removal"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
