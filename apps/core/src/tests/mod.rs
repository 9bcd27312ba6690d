//! Test Module
//!
//! Cross-module suites for the analysis core.
//!
//! ## Test Categories
//! - `analysis_tests`: properties every local result must satisfy
//! - `orchestrator_tests`: remote cascade behaviour with fake and mocked backends

pub mod orchestrator_tests;
