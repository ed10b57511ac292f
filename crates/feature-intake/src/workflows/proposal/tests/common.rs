use std::sync::{Arc, Mutex};

use crate::workflows::proposal::submission::{
    AppendDestination, AppendError, AppendReceipt, AppendRowGateway, ProposalRow,
    SubmissionPipeline,
};
use serde_json::{json, Value};

#[derive(Debug, Default)]
pub(super) struct MemoryGateway {
    rows: Mutex<Vec<Vec<Value>>>,
}

impl MemoryGateway {
    pub(super) fn rows(&self) -> Vec<Vec<Value>> {
        self.rows.lock().expect("rows lock").clone()
    }
}

#[async_trait::async_trait]
impl AppendRowGateway for MemoryGateway {
    async fn append_row(
        &self,
        _destination: &AppendDestination,
        row: &ProposalRow,
    ) -> Result<AppendReceipt, AppendError> {
        let mut guard = self.rows.lock().expect("rows lock");
        guard.push(row.to_json_values());
        let index = guard.len() + 1;
        Ok(AppendReceipt {
            location: Some(format!("Sheet1!A{index}:L{index}")),
            detail: json!({ "updates": { "updatedRows": 1 } }),
        })
    }
}

#[derive(Debug)]
pub(super) struct RejectingGateway;

#[async_trait::async_trait]
impl AppendRowGateway for RejectingGateway {
    async fn append_row(
        &self,
        _destination: &AppendDestination,
        _row: &ProposalRow,
    ) -> Result<AppendReceipt, AppendError> {
        Err(AppendError::Backend(
            "The caller does not have permission".to_string(),
        ))
    }
}

pub(super) fn pipeline_with(gateway: Arc<dyn AppendRowGateway>) -> Arc<SubmissionPipeline> {
    Arc::new(SubmissionPipeline::new(
        gateway,
        AppendDestination::new("sheet-123", "Sheet1!A1"),
    ))
}

pub(super) fn full_payload() -> Value {
    json!({
        "title": "Saved filters",
        "description": "Keep filter presets between visits",
        "problem": "Filters reset every time",
        "currentSolution": "Bookmarks",
        "proposedSolution": "Persist presets per user",
        "beneficiaries": "Analysts",
        "alternatives": "",
        "reach": "1000",
        "impact": 2,
        "confidence": "0.8",
        "effort": 2,
        "riceScore": 8,
    })
}
