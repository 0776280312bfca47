//! EuroFX command-line front end.

pub mod config;
pub mod form;

pub use config::CliConfig;
pub use form::{ConversionForm, FormOutcome};
