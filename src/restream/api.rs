//! go2rtc control API client.

use std::time::Duration;

use tracing::instrument;
use url::Url;

use crate::error::RelayError;

/// Default go2rtc stream registration endpoint.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:1984/api/streams";

/// Something that accepts stream registrations.
pub trait RelayApi {
    /// Register (or replace) the stream `name` with source descriptor `src`.
    ///
    /// Fails only when the request could not be delivered.
    fn put_stream(&self, name: &str, src: &str) -> Result<(), RelayError>;
}

/// Blocking HTTP client for go2rtc's `PUT /api/streams`.
pub struct HttpRelayApi {
    endpoint: Url,
    client: reqwest::blocking::Client,
}

impl HttpRelayApi {
    pub fn new(endpoint: &str) -> Result<Self, RelayError> {
        let endpoint = Url::parse(endpoint).map_err(|source| RelayError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|source| RelayError::Client { source })?;
        Ok(Self { endpoint, client })
    }

    /// The request URL for one registration.
    pub fn stream_url(&self, name: &str, src: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("src", src)
            .append_pair("name", name);
        url
    }
}

impl RelayApi for HttpRelayApi {
    #[instrument(skip(self, src), fields(endpoint = %self.endpoint))]
    fn put_stream(&self, name: &str, src: &str) -> Result<(), RelayError> {
        let response = self
            .client
            .put(self.stream_url(name, src))
            .send()
            .map_err(|source| RelayError::Request {
                name: name.to_string(),
                source,
            })?;

        // go2rtc's reply is not acted on; only transport failures are errors
        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "stream registered");
        } else {
            tracing::warn!(status = status.as_u16(), "relay did not accept stream");
        }
        Ok(())
    }
}
