use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use tracing::debug;

use super::record::{FieldInput, FieldName, FormRecord, RecordError};
use super::scoring::ScoreScale;
use super::submission::SubmissionPipeline;

pub const FEATURE_REQUESTS_PATH: &str = "/api/feature-requests";
pub const SCORE_PREVIEW_PATH: &str = "/api/feature-requests/score";

/// Body posted by the intake form. Numbers may arrive as JSON numbers or numeric strings; any
/// client-computed `riceScore` is ignored and derived again.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPayload {
    #[serde(default)]
    pub title: Option<FieldInput>,
    #[serde(default)]
    pub description: Option<FieldInput>,
    #[serde(default)]
    pub problem: Option<FieldInput>,
    #[serde(default)]
    pub current_solution: Option<FieldInput>,
    #[serde(default)]
    pub proposed_solution: Option<FieldInput>,
    #[serde(default)]
    pub beneficiaries: Option<FieldInput>,
    #[serde(default)]
    pub alternatives: Option<FieldInput>,
    #[serde(default)]
    pub reach: Option<FieldInput>,
    #[serde(default)]
    pub impact: Option<FieldInput>,
    #[serde(default)]
    pub confidence: Option<FieldInput>,
    #[serde(default)]
    pub effort: Option<FieldInput>,
    #[serde(default)]
    pub rice_score: Option<FieldInput>,
}

impl ProposalPayload {
    pub fn into_record(self) -> Result<FormRecord, RecordError> {
        let fields = [
            (FieldName::Title, self.title),
            (FieldName::Description, self.description),
            (FieldName::Problem, self.problem),
            (FieldName::CurrentSolution, self.current_solution),
            (FieldName::ProposedSolution, self.proposed_solution),
            (FieldName::Beneficiaries, self.beneficiaries),
            (FieldName::Alternatives, self.alternatives),
            (FieldName::Reach, self.reach),
            (FieldName::Impact, self.impact),
            (FieldName::Confidence, self.confidence),
            (FieldName::Effort, self.effort),
        ];

        let mut record = FormRecord::new();
        for (field, value) in fields {
            if let Some(value) = value {
                record.set_field(field, value)?;
            }
        }
        Ok(record)
    }
}

/// The four scoring inputs for a preview.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScorePreviewRequest {
    #[serde(default)]
    pub reach: Option<FieldInput>,
    #[serde(default)]
    pub impact: Option<FieldInput>,
    #[serde(default)]
    pub confidence: Option<FieldInput>,
    #[serde(default)]
    pub effort: Option<FieldInput>,
}

#[derive(Clone)]
pub struct ProposalState {
    pub pipeline: Arc<SubmissionPipeline>,
    pub scale: ScoreScale,
}

/// Router exposing proposal submission and score preview. Only POST is accepted.
pub fn proposal_router(pipeline: Arc<SubmissionPipeline>, scale: ScoreScale) -> Router {
    Router::new()
        .route(
            FEATURE_REQUESTS_PATH,
            post(submit_handler).fallback(method_not_allowed),
        )
        .route(
            SCORE_PREVIEW_PATH,
            post(score_handler).fallback(method_not_allowed),
        )
        .with_state(ProposalState { pipeline, scale })
}

pub(crate) async fn submit_handler(
    State(state): State<ProposalState>,
    payload: Result<Json<ProposalPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_request(rejection.body_text()),
    };
    let client_score = payload.rice_score.clone();
    let record = match payload.into_record() {
        Ok(record) => record,
        Err(error) => return invalid_request(error),
    };

    let snapshot = record.snapshot();
    if let Some(FieldInput::Number(claimed)) = client_score {
        if claimed != snapshot.rice_score {
            debug!(
                claimed,
                derived = snapshot.rice_score,
                "client rice score differs from derived score"
            );
        }
    }

    match state.pipeline.submit(&snapshot).await {
        Ok(acknowledgement) => {
            let payload = json!({
                "message": "Success",
                "acknowledgement": acknowledgement,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "message": "Error submitting feature request",
                "error": error.message(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn score_handler(
    State(state): State<ProposalState>,
    request: Result<Json<ScorePreviewRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return invalid_request(rejection.body_text()),
    };
    let fields = [
        (FieldName::Reach, request.reach),
        (FieldName::Impact, request.impact),
        (FieldName::Confidence, request.confidence),
        (FieldName::Effort, request.effort),
    ];

    let mut record = FormRecord::new();
    for (field, value) in fields {
        if let Some(value) = value {
            if let Err(error) = record.set_field(field, value) {
                return invalid_request(error);
            }
        }
    }

    let assessment = state.scale.assess(record.rice_inputs());
    let payload = json!({
        "riceScore": assessment.score(),
        "displayScore": assessment.display_score(),
        "tier": assessment.tier(),
        "guidance": assessment.guidance(),
        "scale": state.scale,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn method_not_allowed() -> Response {
    let payload = json!({ "message": "Method not allowed" });
    (StatusCode::METHOD_NOT_ALLOWED, Json(payload)).into_response()
}

fn invalid_request(error: impl fmt::Display) -> Response {
    let payload = json!({
        "message": "Invalid feature request",
        "error": error.to_string(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}
