//! HNAP challenge-response login.
//!
//! The handshake takes two round-trips. A `request` login returns a
//! challenge, a public key and a `uid` cookie; the client derives a private
//! key, stores it with the cookie, and answers with a `login` action whose
//! password is a digest of the challenge. The resulting [`Session`] signs
//! every later request with a fresh timestamp.

use super::crypto;
use super::messages::{LoginRequest, LoginResponse};
use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use reqwest::Url;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Marker in the login reply that signals success.
const LOGIN_OK: &str = "OK";

/// Credentials and endpoint for one modem's HNAP interface.
#[derive(Debug, Clone)]
pub struct Authenticator {
    endpoint: Url,
    username: String,
    password: String,
}

/// An authenticated HNAP session.
///
/// Owns the transport (and so the cookie store) it logged in on; dropping
/// the session releases both.
#[derive(Debug)]
pub struct Session {
    transport: HttpTransport,
    endpoint: Url,
    private_key: String,
}

impl Authenticator {
    /// `endpoint` is the full HNAP URL, including its trailing slash.
    pub fn new(endpoint: Url, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Runs the handshake on `transport` and returns the signed session.
    pub async fn authenticate(
        &self,
        transport: HttpTransport,
        cancel: &CancellationToken,
    ) -> Result<Session> {
        let login_action = crypto::action_uri("Login");

        tracing::debug!(endpoint = %self.endpoint, "Requesting login challenge");
        let body = transport
            .post_hnap(
                &self.endpoint,
                &login_action,
                None,
                &LoginRequest::request(&self.username),
                cancel,
            )
            .await?;

        let reply: LoginResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::Auth(format!("unexpected challenge response: {}", e)))?;
        let challenge = reply.login_response;
        if challenge.challenge.is_empty() || challenge.public_key.is_empty() {
            return Err(Error::Auth(format!(
                "challenge response missing challenge or public key (result {:?})",
                challenge.login_result
            )));
        }

        let private_key =
            crypto::private_key(&challenge.public_key, &self.password, &challenge.challenge);
        let login_password = crypto::login_password(&private_key, &challenge.challenge);

        transport.set_cookie(&self.endpoint, "uid", &challenge.cookie);
        transport.set_cookie(&self.endpoint, "PrivateKey", &private_key);

        let session = Session {
            transport,
            endpoint: self.endpoint.clone(),
            private_key,
        };

        tracing::debug!("Sending login");
        let body = session
            .call("Login", &LoginRequest::login(&self.username, login_password), cancel)
            .await?;

        if String::from_utf8_lossy(&body).contains(LOGIN_OK) {
            tracing::info!(endpoint = %self.endpoint, "Logged in");
            Ok(session)
        } else {
            Err(Error::Auth(format!(
                "login rejected: {}",
                String::from_utf8_lossy(&body).trim()
            )))
        }
    }
}

impl Session {
    /// Signs a request for `action` with the current time.
    pub fn auth_header(&self, action: &str) -> String {
        crypto::auth_header(&self.private_key, action, crypto::current_timestamp())
    }

    /// The derived private key.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Invokes an HNAP action with a freshly signed header.
    pub async fn call<T: Serialize + ?Sized>(
        &self,
        action: &str,
        body: &T,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let auth = self.auth_header(action);
        self.transport
            .post_hnap(
                &self.endpoint,
                &crypto::action_uri(action),
                Some(&auth),
                body,
                cancel,
            )
            .await
    }
}
