use std::path::PathBuf;

use thiserror::Error;

/// Failures the client raises locally.
///
/// Server-side rejections never appear here: the API reports them in the
/// response body and the client hands them back as
/// [`ApiResponse::ParameterError`](crate::ApiResponse::ParameterError) or
/// [`ApiResponse::AuthError`](crate::ApiResponse::AuthError) values, so batch
/// callers can inspect many results without handling an error per call.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key could be resolved from the credentials file or the caller's
    /// arguments.
    #[error(
        "NSRDB credentials not found: pass an api_key explicitly or create an `.nsrdbrc` file"
    )]
    MissingCredentials,

    /// A credentials file exists but has no `api_key` entry.
    #[error("NSRDB credentials file {} does not contain an `api_key` entry", path.display())]
    Configuration { path: PathBuf },

    /// The query location cannot be expressed as WKT.
    #[error("location is not in a WKT-convertible format: {0}")]
    InvalidLocation(String),

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse API JSON")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse CSV payload")]
    Csv(#[from] csv::Error),

    #[error("failed to read result archive")]
    Zip(#[from] zip::result::ZipError),

    /// A CSV payload ended before the station-metadata preamble and column
    /// row the API always emits.
    #[error("CSV payload is missing its metadata preamble or column row")]
    TruncatedCsv,

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Structured error body: `{"errors": [...]}` for rejected parameters, or
/// `{"error": {"code": ..., "message": ...}}` for key problems reported as
/// JSON.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorReply {
    #[serde(default)]
    pub(crate) errors: Vec<String>,
    #[serde(default)]
    pub(crate) error: Option<ErrorDetail>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}
