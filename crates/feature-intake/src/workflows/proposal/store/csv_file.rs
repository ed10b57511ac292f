use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use serde_json::json;
use tokio::sync::Mutex;

use crate::workflows::proposal::submission::{
    AppendDestination, AppendError, AppendReceipt, AppendRowGateway, ProposalRow, ROW_COLUMNS,
};

/// Local append-only store writing one CSV line per proposal. The destination target is the
/// file path; the range is ignored.
///
/// The data row count of each path is scanned once, on the first append, then tracked in memory.
/// Appends are serialised so row numbers stay unique within the process.
#[derive(Debug, Default)]
pub struct CsvFileGateway {
    row_counts: Mutex<HashMap<PathBuf, usize>>,
}

impl CsvFileGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AppendRowGateway for CsvFileGateway {
    async fn append_row(
        &self,
        destination: &AppendDestination,
        row: &ProposalRow,
    ) -> Result<AppendReceipt, AppendError> {
        let mut row_counts = self.row_counts.lock().await;
        let path = PathBuf::from(&destination.target);
        let known_rows = row_counts.get(&path).copied();

        let record = row.to_strings();
        let task_path = path.clone();
        let row_number = tokio::task::spawn_blocking(move || {
            append_record(&task_path, known_rows, &record)
        })
        .await
        .map_err(map_error)??;
        row_counts.insert(path, row_number);

        Ok(AppendReceipt {
            location: Some(format!("{}#{row_number}", destination.target)),
            detail: json!({ "path": destination.target, "row": row_number }),
        })
    }
}

/// Blocking append. Returns the 1-based data row number of the written record.
fn append_record(
    path: &Path,
    known_rows: Option<usize>,
    record: &[String],
) -> Result<usize, AppendError> {
    let existing_rows = match known_rows {
        Some(count) => Some(count),
        None => count_data_rows(path)?,
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(map_error)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if existing_rows.is_none() {
        writer.write_record(ROW_COLUMNS).map_err(map_error)?;
    }
    writer.write_record(record).map_err(map_error)?;
    writer.flush().map_err(map_error)?;

    Ok(existing_rows.unwrap_or(0) + 1)
}

/// `None` when the file is missing or empty, so a header still needs writing.
fn count_data_rows(path: &Path) -> Result<Option<usize>, AppendError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(map_error(err)),
    };
    if file.metadata().map_err(map_error)?.len() == 0 {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let mut count = 0;
    for record in reader.records() {
        record.map_err(map_error)?;
        count += 1;
    }
    Ok(Some(count))
}

fn map_error<E: std::fmt::Display>(err: E) -> AppendError {
    AppendError::Backend(err.to_string())
}
