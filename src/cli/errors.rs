use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: dcm2niix_task::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Task(#[from] dcm2niix_task::Error),
}
