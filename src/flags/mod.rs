pub mod catalogue;
pub mod config;
pub mod detector;
pub mod summary;

pub use catalogue::{FlagCatalogue, FlagCode, FlagDefinition, Severity};
pub use config::{validate_flags, FlagConfig, FlagThresholds};
pub use detector::{FlaggedProject, RedFlagDetector};
pub use summary::{flag_summary, FlagSummaryRow};
