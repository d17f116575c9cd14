//! JSON bodies exchanged with the HNAP endpoint.

use serde::{Deserialize, Serialize};

/// Body of both login steps.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// The login step itself.
    #[serde(rename = "Login")]
    pub login: Login,
}

/// Fields of one login step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Login {
    /// `request` or `login`.
    pub action: String,
    /// Always empty.
    pub captcha: String,
    /// Derived password, empty on the `request` step.
    pub login_password: String,
    /// Always `LoginPassword`.
    pub private_login: String,
    /// Account name.
    pub username: String,
}

impl LoginRequest {
    /// First step: ask the server for a challenge.
    pub fn request(username: &str) -> Self {
        Self {
            login: Login {
                action: "request".to_string(),
                captcha: String::new(),
                login_password: String::new(),
                private_login: "LoginPassword".to_string(),
                username: username.to_string(),
            },
        }
    }

    /// Second step: prove knowledge of the derived key.
    pub fn login(username: &str, login_password: String) -> Self {
        let mut body = Self::request(username);
        body.login.action = "login".to_string();
        body.login.login_password = login_password;
        body
    }
}

/// Server reply to the `request` step.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Challenge material, or just the result on the `login` step.
    #[serde(rename = "LoginResponse")]
    pub login_response: Challenge,
}

/// Values handed out by the `request` step. Missing fields decode empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Challenge {
    /// Nonce mixed into both key derivations.
    pub challenge: String,
    /// Session id, sent back as the `uid` cookie.
    pub cookie: String,
    /// `OK` on success.
    pub login_result: String,
    /// Prefixed to the password when deriving the private key.
    pub public_key: String,
}

/// Body of the composite downstream + upstream status query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusRequest {
    /// The bundled queries.
    #[serde(rename = "GetMultipleHNAPs")]
    pub queries: StatusQueries,
}

/// Queries bundled into one `GetMultipleHNAPs` call. Each takes no
/// arguments and is sent as an empty string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusQueries {
    /// Downstream channel table query.
    #[serde(rename = "GetCustomerStatusDownstreamChannelInfo")]
    pub downstream: String,
    /// Upstream channel table query.
    #[serde(rename = "GetCustomerStatusUpstreamChannelInfo")]
    pub upstream: String,
}

/// Decoded reply to [`StatusRequest`].
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEnvelope {
    /// Per-query replies.
    #[serde(rename = "GetMultipleHNAPsResponse")]
    pub response: MultipleResponse,
}

/// Replies to each bundled query.
#[derive(Debug, Clone, Deserialize)]
pub struct MultipleResponse {
    /// Downstream query reply.
    #[serde(rename = "GetCustomerStatusDownstreamChannelInfoResponse")]
    pub downstream: DownstreamInfo,
    /// Upstream query reply.
    #[serde(rename = "GetCustomerStatusUpstreamChannelInfoResponse")]
    pub upstream: UpstreamInfo,
    /// Overall result, `OK` on success.
    #[serde(rename = "GetMultipleHNAPsResult", default)]
    pub result: String,
}

/// Downstream table as the modem sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct DownstreamInfo {
    /// Delimited channel table.
    #[serde(rename = "CustomerConnDownstreamChannel")]
    pub table: String,
    /// Query result, `OK` on success.
    #[serde(rename = "GetCustomerStatusDownstreamChannelInfoResult", default)]
    pub result: String,
}

/// Upstream table as the modem sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamInfo {
    /// Delimited channel table.
    #[serde(rename = "CustomerConnUpstreamChannel")]
    pub table: String,
    /// Query result, `OK` on success.
    #[serde(rename = "GetCustomerStatusUpstreamChannelInfoResult", default)]
    pub result: String,
}

impl StatusEnvelope {
    /// Raw downstream table string.
    pub fn downstream(&self) -> &str {
        &self.response.downstream.table
    }

    /// Raw upstream table string.
    pub fn upstream(&self) -> &str {
        &self.response.upstream.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_shape() {
        let json = serde_json::to_value(LoginRequest::request("admin")).unwrap();
        assert_eq!(json["Login"]["Action"], "request");
        assert_eq!(json["Login"]["Username"], "admin");
        assert_eq!(json["Login"]["PrivateLogin"], "LoginPassword");
        assert_eq!(json["Login"]["LoginPassword"], "");
        assert_eq!(json["Login"]["Captcha"], "");
    }

    #[test]
    fn test_login_step_carries_password() {
        let json = serde_json::to_value(LoginRequest::login("admin", "ABC".into())).unwrap();
        assert_eq!(json["Login"]["Action"], "login");
        assert_eq!(json["Login"]["LoginPassword"], "ABC");
    }

    #[test]
    fn test_status_request_shape() {
        let json = serde_json::to_string(&StatusRequest::default()).unwrap();
        assert_eq!(
            json,
            r#"{"GetMultipleHNAPs":{"GetCustomerStatusDownstreamChannelInfo":"","GetCustomerStatusUpstreamChannelInfo":""}}"#
        );
    }

    #[test]
    fn test_challenge_tolerates_missing_fields() {
        let parsed: LoginResponse =
            serde_json::from_str(r#"{"LoginResponse":{"Challenge":"abc"}}"#).unwrap();
        assert_eq!(parsed.login_response.challenge, "abc");
        assert!(parsed.login_response.public_key.is_empty());
    }
}
