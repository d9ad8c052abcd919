use thiserror::Error;

/// Failures retrieving or decoding an upstream feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("http {status}: {snippet}")]
    Status {
        status: reqwest::StatusCode,
        snippet: String,
    },

    #[error("invalid {what} json: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn parse(what: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { what, source }
    }
}
