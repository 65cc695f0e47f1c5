//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod instruments;
pub mod log;
pub mod profile;
pub mod record;
pub mod rewrite;

// Re-export main types for cleaner imports
pub use error::{ConfigError, FetchError};
pub use instruments::InstrumentSource;
pub use profile::{CompanyProfile, ProfileProvider};
pub use record::{InstrumentRecord, RecordCollection};
pub use rewrite::{DescriptionRewriter, RewriteBackend};
