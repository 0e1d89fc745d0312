use std::path::PathBuf;

use api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("not logged in; run `agora login` first")]
    NotLoggedIn,
    #[error("session file {path}: {source}")]
    SessionFile { path: PathBuf, source: std::io::Error },
    #[error("read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
