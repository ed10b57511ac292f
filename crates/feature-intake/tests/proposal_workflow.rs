//! End-to-end scenarios for filling out, scoring and submitting a proposal through the public
//! session and pipeline facade.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use feature_intake::proposal::{
    AppendDestination, AppendError, AppendReceipt, AppendRowGateway, CellValue, FieldName,
    NavigationError, PriorityTier, ProposalRow, ProposalSession, RecordError, ScoreAssessment,
    SubmissionPipeline,
};
use serde_json::json;

#[derive(Debug, Default)]
struct FakeSheet {
    appended: Mutex<Vec<(AppendDestination, ProposalRow)>>,
    failure: Mutex<Option<AppendError>>,
}

impl FakeSheet {
    fn failing(message: &str) -> Self {
        Self {
            appended: Mutex::new(Vec::new()),
            failure: Mutex::new(Some(AppendError::Backend(message.to_string()))),
        }
    }

    fn recover(&self) {
        self.failure.lock().expect("failure lock").take();
    }

    fn appended(&self) -> Vec<(AppendDestination, ProposalRow)> {
        self.appended.lock().expect("append lock").clone()
    }
}

#[async_trait::async_trait]
impl AppendRowGateway for FakeSheet {
    async fn append_row(
        &self,
        destination: &AppendDestination,
        row: &ProposalRow,
    ) -> Result<AppendReceipt, AppendError> {
        if let Some(err) = self.failure.lock().expect("failure lock").clone() {
            return Err(err);
        }
        self.appended
            .lock()
            .expect("append lock")
            .push((destination.clone(), row.clone()));
        Ok(AppendReceipt {
            location: Some("Sheet1!A2:L2".to_string()),
            detail: json!({ "tableRange": "Sheet1!A1:L1" }),
        })
    }
}

fn pipeline(sheet: Arc<FakeSheet>) -> SubmissionPipeline {
    SubmissionPipeline::new(sheet, AppendDestination::new("sheet-123", "Sheet1!A1"))
}

fn fill(session: &mut ProposalSession) {
    session.go_to("intake").expect("intake");
    session.set("title", "Saved filters").expect("title");
    session
        .set("description", "Keep filter presets between visits")
        .expect("description");
    session.go_to("problem").expect("problem");
    session.set("problem", "Filters reset every time").expect("problem");
    session.set("currentSolution", "Bookmarks").expect("current");
    session.set("beneficiaries", "Analysts").expect("beneficiaries");
    session.go_to("scoring").expect("scoring");
    session.set("reach", "1000").expect("reach");
    session.set("impact", "2").expect("impact");
    session.set("confidence", "0.8").expect("confidence");
    session.set("effort", "2").expect("effort");
    session.go_to("solution").expect("solution");
    session
        .set("proposedSolution", "Persist presets per user")
        .expect("proposed");
    session.set("alternatives", "Browser extension").expect("alternatives");
    session.go_to("summary").expect("summary");
}

#[test]
fn canonical_scoring_scenario_is_high_priority() {
    let mut session = ProposalSession::default();
    fill(&mut session);

    let snapshot = session.snapshot();
    assert!((snapshot.rice_score - 800.0).abs() < 1e-9);
    assert_eq!(session.assessment().tier(), Some(PriorityTier::High));
}

#[test]
fn zeroed_record_is_unscored_not_low() {
    let mut session = ProposalSession::default();
    for field in ["reach", "impact", "confidence", "effort"] {
        session.set(field, 0.0).expect("zero accepted");
    }

    assert_eq!(session.snapshot().rice_score, 0.0);
    let assessment = session.assessment();
    assert_eq!(assessment, ScoreAssessment::Unscored);
    assert_ne!(assessment.guidance(), PriorityTier::Low.guidance());
}

#[test]
fn integration_errors_do_not_disturb_state() {
    let mut session = ProposalSession::default();
    fill(&mut session);
    let before = session.snapshot();

    assert_eq!(
        session.set("owner", "platform team"),
        Err(RecordError::UnknownField("owner".to_string()))
    );
    assert_eq!(
        session.set("reach", "many"),
        Err(RecordError::InvalidValue {
            field: FieldName::Reach,
            value: "many".to_string(),
        })
    );
    assert_eq!(
        session.go_to("billing").map(|section| section.name.clone()),
        Err(NavigationError::UnknownSection("billing".to_string()))
    );

    assert_eq!(session.snapshot(), before);
    assert_eq!(session.navigator().active_name(), "summary");
}

#[tokio::test]
async fn submission_appends_twelve_ordered_columns() {
    let sheet = Arc::new(FakeSheet::default());
    let pipeline = pipeline(sheet.clone());
    let mut session = ProposalSession::default();
    fill(&mut session);

    let submitted_at = Utc
        .with_ymd_and_hms(2025, 6, 2, 15, 4, 5)
        .single()
        .expect("valid timestamp");
    let ack = pipeline
        .submit_at(&session.snapshot(), submitted_at)
        .await
        .expect("append succeeds");
    assert_eq!(ack.location.as_deref(), Some("Sheet1!A2:L2"));
    assert_eq!(ack.detail["tableRange"], "Sheet1!A1:L1");

    let appended = sheet.appended();
    assert_eq!(appended.len(), 1);
    let (destination, row) = &appended[0];
    assert_eq!(destination.range, "Sheet1!A1");
    assert_eq!(
        row.cells(),
        &[
            CellValue::Text("2025-06-02T15:04:05.000Z".to_string()),
            CellValue::Text("Saved filters".to_string()),
            CellValue::Text("Filters reset every time".to_string()),
            CellValue::Text("Bookmarks".to_string()),
            CellValue::Number(1000.0),
            CellValue::Number(2.0),
            CellValue::Number(0.8),
            CellValue::Number(2.0),
            CellValue::Number(800.0),
            CellValue::Text("Persist presets per user".to_string()),
            CellValue::Text("Analysts".to_string()),
            CellValue::Text("Browser extension".to_string()),
        ]
    );
}

#[tokio::test]
async fn failed_submission_can_be_retried_without_rebuilding() {
    let sheet = Arc::new(FakeSheet::failing("Requested entity was not found."));
    let pipeline = pipeline(sheet.clone());
    let mut session = ProposalSession::default();
    fill(&mut session);
    let before = session.snapshot();

    let err = session.submit(&pipeline).await.expect_err("store rejects");
    assert_eq!(err.message(), "Requested entity was not found.");
    assert_eq!(session.snapshot(), before);
    assert!(sheet.appended().is_empty());

    sheet.recover();
    let ack = session.submit(&pipeline).await.expect("retry succeeds");
    assert_eq!(sheet.appended().len(), 1);
    let submitted = session.last_submission().expect("submitted snapshot kept");
    assert_eq!(submitted.title, before.title);
    assert_eq!(submitted.submitted_at, Some(ack.submitted_at));
    assert_eq!(session.snapshot().title, "");
}
