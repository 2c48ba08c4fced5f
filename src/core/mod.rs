//! Core building blocks: the static field table, typed inputs, command-line
//! rendering and output resolution. These are consumed by the high-level
//! `api` module.
pub mod cmdline;
pub mod fields;
pub mod outputs;
pub mod params;
