//! Station directory error types.

use crate::irail::IrailError;

/// Errors from loading or refreshing the station list.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The transit provider could not be queried
    #[error("station provider error: {0}")]
    Provider(#[from] IrailError),

    /// The provider answered with no usable stations
    #[error("station provider returned no stations")]
    Empty,

    /// Cache operation failed
    #[error("cache error: {message}")]
    Cache { message: String },
}
