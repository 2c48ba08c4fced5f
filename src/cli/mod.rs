//! Command Line Interface (CLI) layer for dcm2niix-task.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`): options are layered over an
//! optional JSON config, rendered to a dcm2niix command line, run, and the
//! resolved outputs printed.
//!
//! If you are embedding the wrapper into another application, prefer the
//! `dcm2niix_task::Dcm2Niix` task instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
