//! The station list shared by every request.
//!
//! Loaded once at startup (from a disk cache when it is fresh, otherwise
//! from the transit provider) and refreshed in the background.

mod cache;
mod directory;
mod error;
mod source;

pub use cache::{StationCache, StationCacheConfig};
pub use directory::StationDirectory;
pub use error::StationError;
pub use source::StationSource;
