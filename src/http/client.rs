use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::error;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError, RequestError};

/// A completed GET exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Present only when the caller asked to keep the body.
    pub body: Option<String>,
}

/// Client capability used by a single worker.
///
/// Implementations must fully consume the response before returning so the
/// caller's timing covers the whole exchange.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues one GET request against `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] when the request cannot be sent or the
    /// response body cannot be read.
    async fn get(&self, url: &str, keep_body: bool) -> Result<HttpResponse, RequestError>;
}

/// Builds one independent client per worker so workers never share a
/// connection pool.
pub trait ClientFactory: Send + Sync {
    type Client: HttpClient + 'static;

    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be constructed.
    fn build(&self) -> AppResult<Self::Client>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, keep_body: bool) -> Result<HttpResponse, RequestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RequestError::send)?;
        let status = response.status().as_u16();

        let body = if keep_body {
            Some(response.text().await.map_err(RequestError::body)?)
        } else {
            drain_response_body(response)
                .await
                .map_err(RequestError::body)?;
            None
        };

        Ok(HttpResponse { status, body })
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

/// Production factory backed by `reqwest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestFactory;

impl ClientFactory for ReqwestFactory {
    type Client = ReqwestClient;

    fn build(&self) -> AppResult<Self::Client> {
        let client = match Client::builder().user_agent(DEFAULT_USER_AGENT).build() {
            Ok(client) => client,
            Err(err) => {
                error!("Failed to build HTTP client: {}", err);
                return Err(AppError::http(HttpError::BuildClientFailed { source: err }));
            }
        };
        Ok(ReqwestClient { client })
    }
}
