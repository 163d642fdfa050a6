//! Run the container benchmark executable, keep each run as an immutable JSON
//! record, and render candidate-vs-std comparison reports from those records.

pub mod catalog;
pub mod chart;
pub mod error;
pub mod harness;
pub mod metadata;
pub mod parse;
pub mod report;
pub mod runner;
pub mod schema;

pub use error::{Error, Result};
