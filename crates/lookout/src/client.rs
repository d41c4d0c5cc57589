//! HTTP moderation transport.
//!
//! [`HttpTransport`] implements [`ModerationTransport`] over any
//! [`HttpClient`], posting a [`PostQuery`] to `{endpoint}/check_post_priority`
//! and decoding the server's verdict.

use bon::Builder;
use bytes::Bytes;
use http::{HeaderValue, Request, StatusCode};
use lookout_common::error::{DecodeError, EncodeError, HttpError, TransportError};
use lookout_common::http_client::HttpClient;
use lookout_common::{ItemId, ModerationResult, PostQuery, RequestResult};
use url::Url;

use crate::host::ModerationTransport;

/// Path of the moderation endpoint, relative to the server base.
pub const CHECK_POST_PATH: &str = "check_post_priority";

/// Where the transport sends requests and how it builds item links.
#[derive(Debug, Clone, Builder)]
#[builder(start_fn = new)]
pub struct TransportOptions {
    /// Base URL of the moderation server
    pub endpoint: Url,
    /// Base of the public item link sent as `post_url`
    #[builder(default = default_gallery_base())]
    pub gallery_base: Url,
}

fn default_gallery_base() -> Url {
    Url::parse("https://imgur.com/gallery/").expect("valid url")
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::new()
            .endpoint(Url::parse("http://localhost:3030/").expect("valid url"))
            .build()
    }
}

/// Moderation transport speaking the server's JSON protocol over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport<C> {
    client: C,
    options: TransportOptions,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Create a transport using `client`.
    pub fn new(client: C, options: TransportOptions) -> Self {
        Self { client, options }
    }

    /// Transport options.
    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Underlying HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

#[cfg(feature = "reqwest-client")]
impl HttpTransport<reqwest::Client> {
    /// A reqwest-backed transport for the server at `endpoint`.
    pub fn with_endpoint(endpoint: Url) -> Self {
        Self::new(
            reqwest::Client::new(),
            TransportOptions::new().endpoint(endpoint).build(),
        )
    }
}

impl<C> ModerationTransport for HttpTransport<C>
where
    C: HttpClient + Sync,
{
    async fn check_item(&self, item: &ItemId) -> RequestResult<ModerationResult> {
        let query = PostQuery::for_item(item, &self.options.gallery_base)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let request = build_http_request(&self.options.endpoint, &query)?;

        let response = self
            .client
            .send_http(request)
            .await
            .map_err(|e| TransportError::Other(Box::new(e)))?;

        process_response(response)
    }
}

/// Build the POST request carrying `query`.
pub fn build_http_request(
    endpoint: &Url,
    query: &PostQuery,
) -> RequestResult<Request<Vec<u8>>> {
    let mut url = endpoint.clone();
    let mut path = url.path().trim_end_matches('/').to_owned();
    path.push('/');
    path.push_str(CHECK_POST_PATH);
    url.set_path(&path);

    let body = serde_json::to_vec(query).map_err(EncodeError::from)?;

    Request::builder()
        .method(http::Method::POST)
        .uri(url.as_str())
        .header(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
        .header(http::header::ACCEPT, HeaderValue::from_static("application/json"))
        .body(body)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()).into())
}

/// Turn the server's response into a verdict.
///
/// Anything but `200 OK` is an [`HttpError`].
pub fn process_response(
    response: http::Response<Vec<u8>>,
) -> RequestResult<ModerationResult> {
    let status = response.status();
    let buffer = Bytes::from(response.into_body());

    if status != StatusCode::OK {
        return Err(HttpError {
            status,
            body: (!buffer.is_empty()).then_some(buffer),
        }
        .into());
    }

    Ok(serde_json::from_slice(&buffer).map_err(DecodeError::from)?)
}
