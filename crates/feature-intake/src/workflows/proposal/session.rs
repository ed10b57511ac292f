use super::navigator::{NavigationError, Section, SectionNavigator};
use super::record::{FieldInput, FormRecord, FormSnapshot, RecordError};
use super::scoring::{ScoreAssessment, ScoreScale};
use super::submission::{Acknowledgement, SubmissionError, SubmissionPipeline};

/// One submitter's proposal in progress: the record being edited plus the active section.
///
/// `submit` takes `&mut self`, so a second submission cannot start while one is outstanding.
#[derive(Debug)]
pub struct ProposalSession {
    record: FormRecord,
    navigator: SectionNavigator,
    scale: ScoreScale,
    last_submission: Option<FormSnapshot>,
}

impl Default for ProposalSession {
    fn default() -> Self {
        Self::new(SectionNavigator::standard(), ScoreScale::default())
    }
}

impl ProposalSession {
    pub fn new(navigator: SectionNavigator, scale: ScoreScale) -> Self {
        Self {
            record: FormRecord::new(),
            navigator,
            scale,
            last_submission: None,
        }
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut FormRecord {
        &mut self.record
    }

    pub fn navigator(&self) -> &SectionNavigator {
        &self.navigator
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldInput>) -> Result<(), RecordError> {
        self.record.set(field, value)
    }

    pub fn go_to(&mut self, section: &str) -> Result<&Section, NavigationError> {
        self.navigator.go_to(section)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.record.snapshot()
    }

    pub fn assessment(&self) -> ScoreAssessment {
        self.scale.assess(self.record.rice_inputs())
    }

    /// The snapshot that was acknowledged by the most recent successful submit.
    pub fn last_submission(&self) -> Option<&FormSnapshot> {
        self.last_submission.as_ref()
    }

    /// Submit the current record. On success the record is replaced by a fresh one; on failure the
    /// record and the active section are left exactly as they were so the call can be retried.
    pub async fn submit(
        &mut self,
        pipeline: &SubmissionPipeline,
    ) -> Result<Acknowledgement, SubmissionError> {
        let snapshot = self.record.snapshot();
        let acknowledgement = pipeline.submit(&snapshot).await?;

        let mut submitted = snapshot;
        submitted.submitted_at = Some(acknowledgement.submitted_at);
        self.last_submission = Some(submitted);
        self.record = FormRecord::new();

        Ok(acknowledgement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::proposal::scoring::PriorityTier;
    use crate::workflows::proposal::submission::{
        AppendDestination, AppendError, AppendReceipt, AppendRowGateway, ProposalRow,
    };
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct FlakyGateway {
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AppendRowGateway for FlakyGateway {
        async fn append_row(
            &self,
            _destination: &AppendDestination,
            _row: &ProposalRow,
        ) -> Result<AppendReceipt, AppendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(AppendError::Unavailable("network down".to_string()))
            } else {
                Ok(AppendReceipt::default())
            }
        }
    }

    fn filled_session() -> ProposalSession {
        let mut session = ProposalSession::default();
        session.set("title", "CSV import").expect("title");
        session.go_to("scoring").expect("scoring section");
        session.set("reach", "1000").expect("reach");
        session.set("impact", "2").expect("impact");
        session.set("confidence", "0.8").expect("confidence");
        session.set("effort", "2").expect("effort");
        session.go_to("summary").expect("summary section");
        session
    }

    #[test]
    fn assessment_tracks_the_record() {
        let mut session = ProposalSession::default();
        assert_eq!(session.assessment(), ScoreAssessment::Unscored);

        session = filled_session();
        assert_eq!(session.assessment().tier(), Some(PriorityTier::High));
        assert!((session.assessment().score() - 800.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failed_submit_keeps_record_and_section_for_retry() {
        let gateway = Arc::new(FlakyGateway::default());
        gateway.fail.store(true, Ordering::SeqCst);
        let pipeline =
            SubmissionPipeline::new(gateway.clone(), AppendDestination::new("sheet", "A1"));

        let mut session = filled_session();
        let before = session.snapshot();

        let err = session.submit(&pipeline).await.expect_err("store is down");
        assert_eq!(err.message(), "store unavailable: network down");
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.navigator().active_name(), "summary");
        assert!(session.last_submission().is_none());

        gateway.fail.store(false, Ordering::SeqCst);
        session.submit(&pipeline).await.expect("retry succeeds");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn successful_submit_resets_the_record() {
        let gateway = Arc::new(FlakyGateway::default());
        let pipeline = SubmissionPipeline::new(gateway, AppendDestination::new("sheet", "A1"));

        let mut session = filled_session();
        let ack = session.submit(&pipeline).await.expect("submitted");

        let submitted = session.last_submission().expect("kept acknowledged snapshot");
        assert_eq!(submitted.title, "CSV import");
        assert_eq!(submitted.submitted_at, Some(ack.submitted_at));
        assert_eq!(session.snapshot(), FormSnapshot::default());
    }
}
