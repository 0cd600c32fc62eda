use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("failed to load applications: {0}")]
    Load(String),

    #[error("enter a search term or pick a date")]
    EmptyFilterInput,

    #[error("nothing to export: the current result set is empty")]
    ExportPrecondition,

    #[error("failed to delete application {0}: {1}")]
    Delete(i64, String),

    #[error("application '{0}' not found")]
    NotFound(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, CheckError>;
