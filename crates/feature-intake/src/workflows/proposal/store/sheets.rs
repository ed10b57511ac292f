use google_sheets4::api::{AppendValuesResponse, Scope, ValueRange};
use google_sheets4::hyper_util::client::legacy::connect::HttpConnector;
use google_sheets4::{hyper_rustls, hyper_util, yup_oauth2, Sheets};
use serde_json::json;
use tracing::debug;

use crate::config::SheetsConfig;
use crate::workflows::proposal::submission::{
    AppendDestination, AppendError, AppendReceipt, AppendRowGateway, ProposalRow,
};

pub type SheetsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// Appends proposal rows through the generated google-sheets4 client.
pub struct GoogleSheetsGateway<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    hub: Sheets<C>,
}

impl<C> GoogleSheetsGateway<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: Sheets<C>) -> Self {
        Self { hub }
    }

    fn map_error<E: std::fmt::Display>(err: E) -> AppendError {
        AppendError::Backend(err.to_string())
    }
}

impl GoogleSheetsGateway<SheetsConnector> {
    /// Authenticate as the configured service account and build an HTTPS hub.
    pub async fn connect(config: &SheetsConfig) -> Result<Self, AppendError> {
        let key_json = json!({
            "type": "service_account",
            "client_email": config.client_email,
            "private_key": config.private_key,
            "token_uri": config.token_uri,
        });
        let key = yup_oauth2::parse_service_account_key(key_json.to_string())
            .map_err(|err| AppendError::Unavailable(format!("invalid service account key: {err}")))?;

        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|err| AppendError::Unavailable(format!("authenticator: {err}")))?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|err| AppendError::Unavailable(format!("tls roots: {err}")))?
            .https_or_http()
            .enable_http1()
            .build();
        let client =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(connector);

        Ok(Self::new(Sheets::new(client, auth)))
    }
}

impl<C> std::fmt::Debug for GoogleSheetsGateway<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsGateway").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<C> AppendRowGateway for GoogleSheetsGateway<C>
where
    C: google_sheets4::common::Connector + Send + Sync + 'static,
{
    async fn append_row(
        &self,
        destination: &AppendDestination,
        row: &ProposalRow,
    ) -> Result<AppendReceipt, AppendError> {
        let request = ValueRange {
            values: Some(vec![row.to_json_values()]),
            ..ValueRange::default()
        };

        let (_, response) = self
            .hub
            .spreadsheets()
            .values_append(request, &destination.target, &destination.range)
            .value_input_option("RAW")
            .insert_data_option("INSERT_ROWS")
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map_err(GoogleSheetsGateway::<C>::map_error)?;

        debug!(spreadsheet = %destination.target, "sheets append acknowledged");
        Ok(receipt_from_response(&response))
    }
}

fn receipt_from_response(response: &AppendValuesResponse) -> AppendReceipt {
    let location = response
        .updates
        .as_ref()
        .and_then(|updates| updates.updated_range.clone())
        .or_else(|| response.table_range.clone());

    AppendReceipt {
        location,
        detail: serde_json::to_value(response).unwrap_or(serde_json::Value::Null),
    }
}
