pub mod csv_file;
pub mod sheets;

pub use csv_file::CsvFileGateway;
pub use sheets::{GoogleSheetsGateway, SheetsConnector};
