//! HNAP management protocol.
//!
//! Newer modems expose their status through HNAP, a JSON-over-HTTPS RPC
//! where each request names an action in a `SOAPAction` header and is
//! signed with a key derived during login.

pub mod crypto;
mod messages;
mod session;
mod status;

pub use messages::{LoginRequest, LoginResponse, StatusEnvelope, StatusRequest};
pub use session::{Authenticator, Session};
pub use status::{decode_envelope, fetch_status, STATUS_ACTION};

/// Path of the HNAP endpoint. The trailing slash is required.
pub const HNAP_PATH: &str = "/HNAP1/";
