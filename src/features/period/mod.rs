//! Period estimation modules
//!
//! Convert the onset strength envelope into a tempo estimate using:
//! - Autocorrelation with a log-tempo prior

pub mod autocorrelation;

pub use autocorrelation::{estimate_tempo, TempoPrior};
