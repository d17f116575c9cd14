//! Modem models and detection.
//!
//! Callers program against [`Modem`] and never name a concrete model. The
//! [`Registry`] decides which model applies, either by probing the live
//! management interface or by inspecting a captured fixture.

mod registry;
pub mod s33;
pub mod sb6121;

pub use registry::{contains, ModemDescriptor, Registry};

use crate::error::Result;
use crate::signal::Signal;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default management address of DOCSIS modems.
pub const DEFAULT_BASE_URL: &str = "https://192.168.100.1";

/// Default cap on bytes read while probing a page.
pub const DEFAULT_PROBE_LIMIT: usize = 1 << 20;

/// Uniform interface to every supported model.
#[async_trait]
pub trait Modem: Send + Sync {
    /// Model name, e.g. "S33".
    fn name(&self) -> &str;

    /// Acquires one normalized signal snapshot.
    ///
    /// Each call is self-contained: live models open a new transport and,
    /// where required, log in again.
    async fn status(&self, cancel: &CancellationToken) -> Result<Signal>;
}

/// Connection settings supplied by the caller.
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Management interface address, without a trailing path.
    pub base_url: String,
    /// Login user for models that authenticate.
    pub username: String,
    /// Login password for models that authenticate.
    pub password: String,
    /// Replay this capture instead of contacting the modem.
    pub fixture: Option<PathBuf>,
    /// Per-request deadline.
    pub timeout: Duration,
    /// Maximum bytes read from identification and status pages.
    pub probe_limit: usize,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: "admin".to_string(),
            password: "password".to_string(),
            fixture: None,
            timeout: Duration::from_secs(10),
            probe_limit: DEFAULT_PROBE_LIMIT,
        }
    }
}

/// Where a model instance gets its data.
#[derive(Debug, Clone)]
pub enum Source {
    /// Query the modem over the network.
    Live(ModemConfig),
    /// Replay captured bytes.
    Fixture(Arc<[u8]>),
}
