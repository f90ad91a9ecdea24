use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}

/// Failure of a single GET attempt. Always contained by the worker loop.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request failed: {source}")]
    Send {
        #[source]
        source: BoxedSource,
    },
    #[error("Failed to read response body: {source}")]
    Body {
        #[source]
        source: BoxedSource,
    },
}

impl RequestError {
    pub fn send<E>(error: E) -> Self
    where
        E: Into<BoxedSource>,
    {
        RequestError::Send {
            source: error.into(),
        }
    }

    pub fn body<E>(error: E) -> Self
    where
        E: Into<BoxedSource>,
    {
        RequestError::Body {
            source: error.into(),
        }
    }
}
