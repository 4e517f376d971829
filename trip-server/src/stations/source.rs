//! Where the station list comes from.

use std::future::Future;

use crate::domain::Station;
use crate::irail::IrailClient;

use super::error::StationError;

/// Supplies the full station list.
pub trait StationSource {
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, StationError>> + Send;
}

impl StationSource for IrailClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, StationError> {
        Ok(IrailClient::fetch_stations(self).await?)
    }
}
