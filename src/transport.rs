//! HTTP transport for modem management interfaces.
//!
//! Modems serve their management pages from a fixed LAN address, often
//! over HTTPS with a vendor certificate no public root trusts. The
//! transport therefore accepts any certificate. It must never be pointed
//! at anything but the local modem.
//!
//! Each transport owns its own cookie store, so a session's cookies live
//! exactly as long as the transport it was built on. Every request is
//! raced against a [`CancellationToken`].

use crate::error::{Error, Result};
use reqwest::cookie::Jar;
use reqwest::{Client, Url};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Header carrying the per-request HNAP signature.
pub const HNAP_AUTH_HEADER: &str = "HNAP_AUTH";

/// Header naming the HNAP action being invoked.
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// An HTTP client with a private cookie store.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Builds a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, jar })
    }

    /// Stores a path `/` cookie for `url`'s host, marked `Secure` when
    /// `url` is HTTPS.
    pub fn set_cookie(&self, url: &Url, name: &str, value: &str) {
        let secure = if url.scheme() == "https" { "; Secure" } else { "" };
        self.jar
            .add_cookie_str(&format!("{}={}; Path=/{}", name, value, secure), url);
    }

    /// GETs `url` and returns at most `limit` bytes of the body.
    pub async fn get_limited(
        &self,
        url: &Url,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        cancellable(cancel, async {
            let response = self.client.get(url.clone()).send().await?;
            read_limited(url, response, limit).await
        })
        .await
    }

    /// GETs a status page. Unlike [`get_limited`](Self::get_limited), a
    /// non-2xx status is returned as [`Error::Transport`], and a body cut
    /// off at `limit` is logged.
    pub async fn get_page(
        &self,
        url: &Url,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        cancellable(cancel, async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?;
            let body = read_limited(url, response, limit).await?;
            if body.len() >= limit {
                tracing::warn!(%url, limit, "Page reached the size limit, body truncated");
            }
            Ok(body)
        })
        .await
    }

    /// POSTs a JSON body to an HNAP endpoint and returns the response body.
    ///
    /// A non-2xx status is returned as [`Error::Transport`].
    pub async fn post_hnap<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        soap_action: &str,
        auth: Option<&str>,
        body: &T,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        cancellable(cancel, async {
            let mut request = self
                .client
                .post(url.clone())
                .header(SOAP_ACTION_HEADER, soap_action)
                .json(body);
            if let Some(auth) = auth {
                request = request.header(HNAP_AUTH_HEADER, auth);
            }

            let response = request.send().await?.error_for_status()?;
            let bytes = response.bytes().await?;
            tracing::debug!(%url, soap_action, bytes = bytes.len(), "HNAP call completed");
            Ok(bytes.to_vec())
        })
        .await
    }
}

/// Reads at most `limit` bytes of `response`'s body.
async fn read_limited(url: &Url, mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while body.len() < limit {
        match response.chunk().await? {
            Some(chunk) => body.extend_from_slice(&chunk),
            None => break,
        }
    }
    body.truncate(limit);
    tracing::debug!(%url, bytes = body.len(), "Fetched page");
    Ok(body)
}

/// Runs `fut` unless `cancel` fires first.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}

/// Joins `path` onto a base address such as `https://192.168.100.1`.
pub fn endpoint(base: &str, path: &str) -> Result<Url> {
    let base = base.trim_end_matches('/');
    Url::parse(&format!("{}{}", base, path))
        .map_err(|e| Error::InvalidUrl(format!("{}{}: {}", base, path, e)))
}
