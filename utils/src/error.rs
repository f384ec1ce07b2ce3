use thiserror::Error;

#[derive(Debug, Error)]
pub enum UtilsError {
    #[error("unknown log format: {0} (expected human or json)")]
    UnknownLogFormat(String),

    #[error("logging init failed: {0}")]
    Logging(String),
}
