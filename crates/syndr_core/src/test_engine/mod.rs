//! End-to-end test engine.
//!
//! - `procedures` - Name-to-procedure map and the one-time database setup
//! - `runner` - Dispatch, result normalization and summaries
//! - `planned` - Names of tests that are declared but not implemented

pub mod planned;
pub mod procedures;
pub mod runner;

pub use procedures::{Procedure, ProcedureInfo, ProcedureRegistry};
pub use runner::TestRunner;
