use thiserror::Error;

/// Problems with the configuration file. All of them stop the process before
/// any request goes out.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failures talking to an HTTP API (game host or chat).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Provider reported status {0:?}")]
    Envelope(String),
}

/// Failures of the boost history store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unable to (de)serialize stored boosts: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}
