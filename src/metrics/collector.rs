//! Metrics collection and registry.

use crate::error::Error;
use crate::modem::Modem;
use crate::signal::Signal;
use futures::future::{BoxFuture, FutureExt, Shared};
use prometheus::{Encoder, Gauge, GaugeVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// A gauge could not be created or registered.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

const DOWNSTREAM_LABELS: &[&str] = &["channel", "frequency_hz", "modulation"];
const CODEWORD_LABELS: &[&str] = &["channel"];
const UPSTREAM_LABELS: &[&str] = &[
    "channel",
    "frequency_hz",
    "modulation",
    "ranging_service",
    "ranging_status",
];

/// Prometheus registry holding per-channel signal gauges.
pub struct MetricsRegistry {
    registry: Registry,

    // Downstream
    downstream_snr: GaugeVec,
    downstream_power_level: GaugeVec,
    codewords_unerrored: GaugeVec,
    codewords_correctable: GaugeVec,
    codewords_uncorrectable: GaugeVec,

    // Upstream
    upstream_power_level: GaugeVec,
    upstream_symbol_rate: GaugeVec,

    // Scrape
    scrape_success: IntGauge,
    scrape_duration: Gauge,
}

fn gauge_vec(name: &str, help: &str, labels: &[&str]) -> Result<GaugeVec, MetricsError> {
    Ok(GaugeVec::new(Opts::new(name, help), labels)?)
}

impl MetricsRegistry {
    /// Creates a registry with every signal metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let downstream_snr = gauge_vec(
            "downstream_snr",
            "Downstream signal-to-noise ratio in dB",
            DOWNSTREAM_LABELS,
        )?;
        let downstream_power_level = gauge_vec(
            "downstream_power_level",
            "Downstream power level reading in dBmV",
            DOWNSTREAM_LABELS,
        )?;
        let codewords_unerrored = gauge_vec(
            "codewords_unerrored",
            "Unerrored codeword count",
            CODEWORD_LABELS,
        )?;
        let codewords_correctable = gauge_vec(
            "codewords_correctable",
            "Correctable codeword count",
            CODEWORD_LABELS,
        )?;
        let codewords_uncorrectable = gauge_vec(
            "codewords_uncorrectable",
            "Uncorrectable codeword count",
            CODEWORD_LABELS,
        )?;
        let upstream_power_level = gauge_vec(
            "upstream_power_level",
            "Upstream power level reading in dBmV",
            UPSTREAM_LABELS,
        )?;
        let upstream_symbol_rate = gauge_vec(
            "upstream_symbol_rate",
            "Upstream symbol rate in sym/sec",
            UPSTREAM_LABELS,
        )?;
        let scrape_success = IntGauge::new(
            "surfer_scrape_success",
            "Whether the last modem poll succeeded (1=yes, 0=no)",
        )?;
        let scrape_duration = Gauge::new(
            "surfer_scrape_duration_seconds",
            "Duration of the last modem poll in seconds",
        )?;

        registry.register(Box::new(downstream_snr.clone()))?;
        registry.register(Box::new(downstream_power_level.clone()))?;
        registry.register(Box::new(codewords_unerrored.clone()))?;
        registry.register(Box::new(codewords_correctable.clone()))?;
        registry.register(Box::new(codewords_uncorrectable.clone()))?;
        registry.register(Box::new(upstream_power_level.clone()))?;
        registry.register(Box::new(upstream_symbol_rate.clone()))?;
        registry.register(Box::new(scrape_success.clone()))?;
        registry.register(Box::new(scrape_duration.clone()))?;

        Ok(Self {
            registry,
            downstream_snr,
            downstream_power_level,
            codewords_unerrored,
            codewords_correctable,
            codewords_uncorrectable,
            upstream_power_level,
            upstream_symbol_rate,
            scrape_success,
            scrape_duration,
        })
    }

    /// Replaces every per-channel series with the readings in `signal`.
    ///
    /// Channels missing from `signal` disappear from the output rather than
    /// keeping their last value.
    pub fn update(&self, signal: &Signal) {
        self.downstream_snr.reset();
        self.downstream_power_level.reset();
        self.codewords_unerrored.reset();
        self.codewords_correctable.reset();
        self.codewords_uncorrectable.reset();
        self.upstream_power_level.reset();
        self.upstream_symbol_rate.reset();

        for (channel, d) in &signal.downstream {
            let labels = [channel.as_str(), frequency_hz(&d.frequency), d.modulation.as_str()];
            self.downstream_snr.with_label_values(&labels).set(d.snr);
            self.downstream_power_level
                .with_label_values(&labels)
                .set(d.power_level);

            let channel = [channel.as_str()];
            self.codewords_unerrored
                .with_label_values(&channel)
                .set(d.unerrored);
            self.codewords_correctable
                .with_label_values(&channel)
                .set(d.correctable);
            self.codewords_uncorrectable
                .with_label_values(&channel)
                .set(d.uncorrectable);
        }

        for (channel, u) in &signal.upstream {
            let labels = [
                channel.as_str(),
                frequency_hz(&u.frequency),
                u.modulation.as_str(),
                u.ranging_service.as_str(),
                u.status.as_str(),
            ];
            self.upstream_power_level
                .with_label_values(&labels)
                .set(u.power_level);
            self.upstream_symbol_rate
                .with_label_values(&labels)
                .set(u.symbol_rate);
        }

        tracing::debug!(
            downstream = signal.downstream.len(),
            upstream = signal.upstream.len(),
            "Updated signal metrics"
        );
    }

    /// Records the outcome of one poll.
    pub fn record_scrape(&self, success: bool, duration: Duration) {
        self.scrape_success.set(i64::from(success));
        self.scrape_duration.set(duration.as_secs_f64());
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// "567000000 Hz" -> "567000000".
fn frequency_hz(frequency: &str) -> &str {
    frequency.trim_end_matches(" Hz")
}

/// Outcome of one poll, shared by every caller that joined it.
pub type PollResult = std::result::Result<Arc<Signal>, Arc<Error>>;

type InFlight = Shared<BoxFuture<'static, PollResult>>;

/// Polls a modem on demand, merging overlapping requests.
///
/// A caller that arrives while a poll is in flight waits for that poll
/// instead of starting another, so N simultaneous scrapes cost the modem a
/// single round-trip. The next caller after completion starts a fresh one.
pub struct SignalPoller {
    modem: Arc<dyn Modem>,
    cancel: CancellationToken,
    in_flight: Mutex<Option<InFlight>>,
}

impl SignalPoller {
    /// Wraps `modem`. Firing `cancel` aborts any in-flight poll.
    pub fn new(modem: Arc<dyn Modem>, cancel: CancellationToken) -> Self {
        Self {
            modem,
            cancel,
            in_flight: Mutex::new(None),
        }
    }

    /// Name of the polled model.
    pub fn model(&self) -> &str {
        self.modem.name()
    }

    /// Returns the current poll's result, starting a poll if none is running.
    pub async fn poll(&self) -> PollResult {
        let poll = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(running) => {
                    tracing::debug!("Joining in-flight poll");
                    running.clone()
                }
                None => {
                    let modem = Arc::clone(&self.modem);
                    let cancel = self.cancel.clone();
                    let poll = async move {
                        modem
                            .status(&cancel)
                            .await
                            .map(Arc::new)
                            .map_err(Arc::new)
                    }
                    .boxed()
                    .shared();
                    *slot = Some(poll.clone());
                    poll
                }
            }
        };

        let result = poll.clone().await;

        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|running| running.ptr_eq(&poll)) {
            *slot = None;
        }
        result
    }
}

impl std::fmt::Debug for SignalPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalPoller")
            .field("model", &self.modem.name())
            .finish_non_exhaustive()
    }
}
