use super::common::*;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::proposal::router::{
    proposal_router, submit_handler, ProposalPayload, ProposalState, FEATURE_REQUESTS_PATH,
    SCORE_PREVIEW_PATH,
};
use crate::workflows::proposal::scoring::ScoreScale;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

fn payload(value: Value) -> ProposalPayload {
    serde_json::from_value(value).expect("payload deserializes")
}

#[tokio::test]
async fn submit_handler_recomputes_score_and_appends_row() {
    let gateway = Arc::new(MemoryGateway::default());
    let state = ProposalState {
        pipeline: pipeline_with(gateway.clone()),
        scale: ScoreScale::Weighted,
    };

    let response = submit_handler(State(state), Ok(Json(payload(full_payload())))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Success");
    assert_eq!(body["acknowledgement"]["location"], "Sheet1!A2:L2");

    let rows = gateway.rows();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.len(), 12);
    assert_eq!(row[1], json!("Saved filters"));
    assert_eq!(row[4], json!(1000.0));
    assert_eq!(row[8], json!(800.0));
    assert_eq!(row[11], json!(""));
}

#[tokio::test]
async fn submit_handler_rejects_non_numeric_factor() {
    let gateway = Arc::new(MemoryGateway::default());
    let state = ProposalState {
        pipeline: pipeline_with(gateway.clone()),
        scale: ScoreScale::Weighted,
    };
    let mut body = full_payload();
    body["effort"] = json!("a few sprints");

    let response = submit_handler(State(state), Ok(Json(payload(body)))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("error text").contains("effort"));
    assert!(gateway.rows().is_empty());
}

#[tokio::test]
async fn submit_handler_reports_store_failure_verbatim() {
    let state = ProposalState {
        pipeline: pipeline_with(Arc::new(RejectingGateway)),
        scale: ScoreScale::Weighted,
    };

    let response = submit_handler(State(state), Ok(Json(payload(full_payload())))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Error submitting feature request");
    assert_eq!(body["error"], "The caller does not have permission");
}

#[tokio::test]
async fn sparse_payload_is_still_submitted() {
    let gateway = Arc::new(MemoryGateway::default());
    let router = proposal_router(pipeline_with(gateway.clone()), ScoreScale::Weighted);

    let response = router
        .oneshot(
            Request::post(FEATURE_REQUESTS_PATH)
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(r#"{"title":"Only a title"}"#))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let rows = gateway.rows();
    assert_eq!(rows[0][1], json!("Only a title"));
    assert_eq!(rows[0][8], json!(0.0));
}

#[tokio::test]
async fn other_verbs_are_method_not_allowed() {
    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let router = proposal_router(
            pipeline_with(Arc::new(MemoryGateway::default())),
            ScoreScale::Weighted,
        );
        let response = router
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri(FEATURE_REQUESTS_PATH)
                    .body(axum::body::Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        let body = body_json(response).await;
        assert_eq!(body["message"], "Method not allowed");
    }
}

#[tokio::test]
async fn score_preview_distinguishes_unscored() {
    let router = proposal_router(
        pipeline_with(Arc::new(MemoryGateway::default())),
        ScoreScale::Weighted,
    );

    let response = router
        .clone()
        .oneshot(
            Request::post(SCORE_PREVIEW_PATH)
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    r#"{"reach":0,"impact":0,"confidence":0,"effort":0}"#,
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let body = body_json(response).await;
    assert_eq!(body["riceScore"], json!(0.0));
    assert_eq!(body["tier"], Value::Null);
    assert!(body["guidance"]
        .as_str()
        .expect("guidance")
        .starts_with("Not scored yet"));

    let response = router
        .oneshot(
            Request::post(SCORE_PREVIEW_PATH)
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    r#"{"reach":"3","impact":1,"confidence":1,"effort":1}"#,
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let body = body_json(response).await;
    assert_eq!(body["tier"], "low");
    assert_eq!(body["displayScore"], "3.00");
}

#[tokio::test]
async fn undecodable_bodies_get_the_json_error_shape() {
    for body in [r#"{"title":"Dark mode","reach":true}"#, r#"{"title":"#] {
        let gateway = Arc::new(MemoryGateway::default());
        let router = proposal_router(pipeline_with(gateway.clone()), ScoreScale::Weighted);

        let response = router
            .oneshot(
                Request::post(FEATURE_REQUESTS_PATH)
                    .header(axum::http::header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid feature request");
        assert!(json["error"].is_string());
        assert!(gateway.rows().is_empty());
    }
}

#[tokio::test]
async fn score_preview_rejects_undecodable_body_as_json() {
    let router = proposal_router(
        pipeline_with(Arc::new(MemoryGateway::default())),
        ScoreScale::Weighted,
    );

    let response = router
        .oneshot(
            Request::post(SCORE_PREVIEW_PATH)
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(r#"{"reach":[1]}"#))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid feature request");
}
