//! Prometheus metrics exporter for modem signal readings.
//!
//! Every scrape of `/metrics` polls the modem once (concurrent scrapes share
//! a poll), replaces the per-channel series, and renders the text format.
//!
//! # Metrics Exposed
//!
//! ## Downstream
//! - `downstream_snr` - Signal-to-noise ratio in dB
//! - `downstream_power_level` - Power level in dBmV
//! - `codewords_unerrored`, `codewords_correctable`, `codewords_uncorrectable`
//!   - Codeword counters, labelled by channel only
//!
//! ## Upstream
//! - `upstream_power_level` - Power level in dBmV
//! - `upstream_symbol_rate` - Symbol rate in sym/sec
//!
//! ## Scrape
//! - `surfer_scrape_success` - 1 if the last poll succeeded
//! - `surfer_scrape_duration_seconds` - Duration of the last poll
//!
//! # Example
//!
//! ```no_run
//! use surfer::metrics::MetricsRegistry;
//! use surfer::modem::{s33::S33, Modem};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = MetricsRegistry::new()?;
//! let modem = S33::from_capture(std::fs::read("testdata/S33-signal.json")?);
//!
//! let signal = modem.status(&CancellationToken::new()).await?;
//! registry.update(&signal);
//! println!("{}", registry.encode()?);
//! # Ok(())
//! # }
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, PollResult, SignalPoller};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
