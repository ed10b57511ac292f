//! Feature proposal intake: the editable record, section navigation, RICE scoring and the
//! append-only submission pipeline.

pub mod navigator;
pub mod record;
pub mod router;
pub mod scoring;
pub mod session;
pub mod store;
pub mod submission;

#[cfg(test)]
mod tests;

pub use navigator::{NavigationError, Section, SectionNavigator};
pub use record::{FieldInput, FieldName, FormRecord, FormSnapshot, RecordChange, RecordError};
pub use router::{proposal_router, ProposalPayload, ScorePreviewRequest};
pub use scoring::{
    rice_score, tier, FactorOption, PriorityTier, RiceInputs, ScoreAssessment, ScoreScale,
    TierThresholds,
};
pub use session::ProposalSession;
pub use store::{CsvFileGateway, GoogleSheetsGateway, SheetsConnector};
pub use submission::{
    Acknowledgement, AppendDestination, AppendError, AppendReceipt, AppendRowGateway, CellValue,
    ProposalRow, SubmissionError, SubmissionPipeline, ROW_COLUMNS,
};
