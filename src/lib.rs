pub mod config;
pub mod error;
pub mod flags;
pub mod load;
pub mod output;
pub mod portfolio;
pub mod project;
pub mod scoring;
pub mod screen;

pub use error::ScreenerError;
pub use screen::{Screener, ScreeningReport};
