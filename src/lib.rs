//! Cable Modem Signal Library
//!
//! Acquires per-channel downstream and upstream signal readings from
//! consumer DOCSIS cable modems and normalizes them into one model,
//! regardless of how each vendor formats its status pages.
//!
//! # Architecture
//!
//! ```text
//! registry (probe) → modem → transport / hnap → parse → Signal
//!                                                          ↓
//!                                                       metrics
//! ```
//!
//! # Supported Models
//!
//! - **ARRIS S33**: HNAP over HTTPS with a challenge-response login;
//!   tables are `|+|` / `^` delimited strings.
//! - **Motorola SB6121**: unauthenticated HTML page with one column per
//!   channel.
//!
//! # Example
//!
//! ```no_run
//! use surfer::{CancellationToken, ModemConfig, Registry};
//!
//! # async fn run() -> surfer::Result<()> {
//! let registry = Registry::with_builtin_models();
//! let config = ModemConfig {
//!     password: "hunter2".into(),
//!     ..Default::default()
//! };
//!
//! let cancel = CancellationToken::new();
//! let modem = registry.identify(&config, &cancel).await?;
//! let signal = modem.status(&cancel).await?;
//!
//! for (channel, downstream) in &signal.downstream {
//!     println!("{}: {} dB", channel, downstream.snr);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod hnap;
pub mod metrics;
pub mod modem;
pub mod parse;
pub mod signal;
pub mod transport;

// Re-export commonly used types at crate root
pub use config::FileConfig;
pub use error::{Error, Result};
pub use modem::{Modem, ModemConfig, Registry};
pub use signal::{Channel, Downstream, Signal, Upstream};
pub use tokio_util::sync::CancellationToken;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
