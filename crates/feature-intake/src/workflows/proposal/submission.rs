use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::record::FormSnapshot;

/// Header labels for the twelve appended columns, in row order.
pub const ROW_COLUMNS: [&str; 12] = [
    "Submitted At",
    "Title",
    "Problem",
    "Current Solution",
    "Reach",
    "Impact",
    "Confidence",
    "Effort",
    "RICE Score",
    "Proposed Solution",
    "Beneficiaries",
    "Alternatives",
];

/// One scalar cell of an appended row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&CellValue> for serde_json::Value {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::Text(text) => serde_json::Value::String(text.clone()),
            CellValue::Number(number) => serde_json::Value::from(*number),
        }
    }
}

/// The positional row handed to the append-only store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProposalRow {
    cells: Vec<CellValue>,
}

impl ProposalRow {
    pub fn from_snapshot(snapshot: &FormSnapshot, submitted_at: DateTime<Utc>) -> Self {
        let text = |value: &str| CellValue::Text(value.to_string());
        let cells = vec![
            CellValue::Text(submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            text(&snapshot.title),
            text(&snapshot.problem),
            text(&snapshot.current_solution),
            CellValue::Number(snapshot.reach),
            CellValue::Number(snapshot.impact),
            CellValue::Number(snapshot.confidence),
            CellValue::Number(snapshot.effort),
            CellValue::Number(snapshot.rice_inputs().score()),
            text(&snapshot.proposed_solution),
            text(&snapshot.beneficiaries),
            text(&snapshot.alternatives),
        ];
        Self { cells }
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn to_json_values(&self) -> Vec<serde_json::Value> {
        self.cells.iter().map(serde_json::Value::from).collect()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.cells.iter().map(ToString::to_string).collect()
    }
}

/// Where rows are appended: a spreadsheet id and A1 range, or a file path for local stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendDestination {
    pub target: String,
    pub range: String,
}

impl AppendDestination {
    pub fn new(target: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            range: range.into(),
        }
    }
}

impl fmt::Display for AppendDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.range.is_empty() {
            f.write_str(&self.target)
        } else {
            write!(f, "{} ({})", self.target, self.range)
        }
    }
}

/// Opaque receipt from the store. `location` and `detail` are passed through uninterpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledgement {
    pub submitted_at: DateTime<Utc>,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub detail: serde_json::Value,
}

/// What a store adapter reports back; the pipeline adds the submission timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppendReceipt {
    pub location: Option<String>,
    pub detail: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppendError {
    #[error("{0}")]
    Backend(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The single operation consumed from the append-only tabular store.
#[async_trait::async_trait]
pub trait AppendRowGateway: fmt::Debug + Send + Sync {
    async fn append_row(
        &self,
        destination: &AppendDestination,
        row: &ProposalRow,
    ) -> Result<AppendReceipt, AppendError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error submitting feature request: {source}")]
pub struct SubmissionError {
    #[source]
    source: AppendError,
}

impl SubmissionError {
    /// The store's failure message, suitable for showing verbatim.
    pub fn message(&self) -> String {
        self.source.to_string()
    }

    pub fn append_error(&self) -> &AppendError {
        &self.source
    }
}

impl From<AppendError> for SubmissionError {
    fn from(source: AppendError) -> Self {
        Self { source }
    }
}

/// Turns snapshots into rows and appends them, one store call per submit.
#[derive(Debug, Clone)]
pub struct SubmissionPipeline {
    gateway: Arc<dyn AppendRowGateway>,
    destination: AppendDestination,
}

impl SubmissionPipeline {
    pub fn new(gateway: Arc<dyn AppendRowGateway>, destination: AppendDestination) -> Self {
        Self {
            gateway,
            destination,
        }
    }

    pub fn destination(&self) -> &AppendDestination {
        &self.destination
    }

    pub async fn submit(
        &self,
        snapshot: &FormSnapshot,
    ) -> Result<Acknowledgement, SubmissionError> {
        self.submit_at(snapshot, Utc::now()).await
    }

    /// Submit with an explicit timestamp for the first column. No retry is attempted.
    pub async fn submit_at(
        &self,
        snapshot: &FormSnapshot,
        submitted_at: DateTime<Utc>,
    ) -> Result<Acknowledgement, SubmissionError> {
        let row = ProposalRow::from_snapshot(snapshot, submitted_at);

        match self.gateway.append_row(&self.destination, &row).await {
            Ok(receipt) => {
                info!(
                    destination = %self.destination,
                    location = ?receipt.location,
                    title = %snapshot.title,
                    rice_score = snapshot.rice_inputs().score(),
                    "feature request appended"
                );
                Ok(Acknowledgement {
                    submitted_at,
                    destination: self.destination.target.clone(),
                    location: receipt.location,
                    detail: receipt.detail,
                })
            }
            Err(err) => {
                warn!(
                    destination = %self.destination,
                    error = %err,
                    "feature request append failed"
                );
                Err(SubmissionError::from(err))
            }
        }
    }
}
