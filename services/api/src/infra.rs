use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use feature_intake::config::StoreConfig;
use feature_intake::error::AppError;
use feature_intake::proposal::{
    AppendDestination, AppendRowGateway, CsvFileGateway, GoogleSheetsGateway, SheetsConnector,
    SubmissionPipeline,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the configured append-only store into a submission pipeline.
pub(crate) async fn build_pipeline(store: &StoreConfig) -> Result<SubmissionPipeline, AppError> {
    let (gateway, destination) = match store {
        StoreConfig::GoogleSheets(sheets) => {
            let gateway: Arc<dyn AppendRowGateway> =
                Arc::new(GoogleSheetsGateway::<SheetsConnector>::connect(sheets).await?);
            (
                gateway,
                AppendDestination::new(&sheets.spreadsheet_id, &sheets.range),
            )
        }
        StoreConfig::CsvFile { path } => {
            let gateway: Arc<dyn AppendRowGateway> = Arc::new(CsvFileGateway::new());
            (gateway, AppendDestination::new(path.display().to_string(), ""))
        }
    };

    Ok(SubmissionPipeline::new(gateway, destination))
}
