//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O and JSON errors, and provides semantic variants
//! for input validation, tool invocation and output resolution failures.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Where dcm2niix documents the post-fixes it appends to disambiguate outputs.
pub const FILENAMING_DOC: &str =
    "https://github.com/rordenlab/dcm2niix/blob/master/FILENAMING.md#file-name-post-fixes-image-disambiguation";

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    #[error("Invalid value for {field}: {value:?} (allowed: {allowed})")]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Invalid argument: {field}={value} ({reason})")]
    InvalidArgument {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing required argument: {field}")]
    MissingArgument { field: &'static str },

    #[error("Fields {first} and {second} are mutually exclusive")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },

    #[error("Unrecognised command-line token: {token}")]
    UnexpectedToken { token: String },

    #[error("Failed to execute '{}': {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dcm2niix exited with status {code}: {stderr}")]
    ToolFailed { code: i32, stderr: String },

    #[error(
        "Multiple candidates for {output} in {}, select one with the 'echo' or 'suffix' input \
         (see {}):\n{}",
        .dir.display(),
        FILENAMING_DOC,
        .candidates.join("\n")
    )]
    AmbiguousOutput {
        output: &'static str,
        dir: PathBuf,
        candidates: Vec<String>,
    },

    #[error(
        "Expected {output} at {} but it was not produced (see {}){}",
        .expected.display(),
        FILENAMING_DOC,
        render_found(.candidates)
    )]
    MissingOutput {
        output: &'static str,
        expected: PathBuf,
        candidates: Vec<String>,
    },
}

fn render_found(candidates: &[String]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!("; found instead:\n{}", candidates.join("\n"))
    }
}

impl Error {
    pub fn invalid_argument<V: ToString, R: ToString>(
        field: &'static str,
        value: V,
        reason: R,
    ) -> Self {
        Error::InvalidArgument {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
