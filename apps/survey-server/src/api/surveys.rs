// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{ErrorResponse, SubmitResponse, SurveyListResponse, SurveyQuery, SurveySubmission},
    state::AppState,
    storage::ListLimit,
};

#[utoipa::path(
    post,
    path = "/api/submit",
    request_body = SurveySubmission,
    tag = "Surveys",
    responses(
        (status = 200, body = SubmitResponse),
        (status = 400, description = "Not a JSON object, or no name", body = ErrorResponse),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    )
)]
pub async fn submit_survey(
    State(state): State<AppState>,
    payload: Result<Json<SurveySubmission>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(SurveySubmission(record)) = payload?;
    let receipt = state.submissions.submit(record).await?;
    Ok(Json(SubmitResponse {
        success: true,
        id: receipt.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/surveys",
    params(SurveyQuery),
    tag = "Surveys",
    security(("bearer" = [])),
    responses(
        (status = 200, body = SurveyListResponse),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 500, description = "Record store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_surveys(
    _admin: AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<SurveyQuery>,
) -> Result<Json<SurveyListResponse>, ApiError> {
    let limit = ListLimit::from_query(query.limit.as_deref());
    let listing = state.retrieval.list(limit).await?;
    Ok(Json(SurveyListResponse {
        success: true,
        rows: listing.rows.into_iter().map(|row| row.into_row()).collect(),
        dropped: listing.dropped,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use axum::http::StatusCode;
    use serde_json::json;

    fn submission(value: serde_json::Value) -> Result<Json<SurveySubmission>, JsonRejection> {
        Ok(Json(serde_json::from_value(value).unwrap()))
    }

    #[tokio::test]
    async fn submit_then_list() {
        let (state, _temp) = test_state();

        let Json(first) = submit_survey(
            State(state.clone()),
            submission(json!({"name": "Ann", "email": "a@x.com"})),
        )
        .await
        .expect("submission succeeds");
        assert!(first.success);
        assert_eq!(first.id, 1);

        let Json(second) = submit_survey(State(state.clone()), submission(json!({"name": "Bo"})))
            .await
            .unwrap();
        assert_eq!(second.id, 2);

        let Json(listing) = list_surveys(AdminOnly, State(state), Query(SurveyQuery::default()))
            .await
            .unwrap();
        assert!(listing.success);
        assert_eq!(listing.dropped, 0);
        let names: Vec<_> = listing.rows.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("Bo"), json!("Ann")]);
        assert_eq!(listing.rows[1]["email"], "a@x.com");
        assert_eq!(listing.rows[1]["id"], 1);
        assert!(listing.rows[1]["created_at"].is_string());
    }

    #[tokio::test]
    async fn list_respects_limit_and_ignores_garbage() {
        let (state, _temp) = test_state();
        for n in 0..3 {
            let Json(receipt) =
                submit_survey(State(state.clone()), submission(json!({"name": format!("p{n}")})))
                    .await
                    .unwrap();
            assert_eq!(receipt.id, n + 1);
        }

        let query = SurveyQuery {
            limit: Some("2".into()),
        };
        let Json(listing) = list_surveys(AdminOnly, State(state.clone()), Query(query))
            .await
            .unwrap();
        assert_eq!(listing.rows.len(), 2);
        assert_eq!(listing.rows[0]["name"], "p2");

        let query = SurveyQuery {
            limit: Some("lots".into()),
        };
        let Json(listing) = list_surveys(AdminOnly, State(state), Query(query))
            .await
            .unwrap();
        assert_eq!(listing.rows.len(), 3);
    }

    #[tokio::test]
    async fn submit_without_name_is_rejected() {
        let (state, _temp) = test_state();
        let err = submit_survey(State(state.clone()), submission(json!({"email": "a@x.com"})))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(state.records.count().unwrap(), 0);
    }
}
