use confentry_core::DurationError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {name}: {source}")]
    Duration {
        name: String,
        #[source]
        source: DurationError,
    },

    #[error(transparent)]
    Http(#[from] confentry_http::Error),
}
