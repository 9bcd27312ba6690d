//! TextLens core: deterministic text analysis with an optional remote first pass.

pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod remote;
pub mod telemetry;

pub use analysis::AnalysisOrchestrator;
pub use error::AppError;

#[cfg(test)]
mod tests;
