//! Batch orchestration and the cross-article statistics it produces.

pub mod corpus;
pub mod engine;
pub mod matrix;
pub mod report;
pub mod sentiment;

pub use engine::{AnalysisEngine, RunOutcome, RunState};
pub use report::{AnalysisReport, Stage, Warning};
