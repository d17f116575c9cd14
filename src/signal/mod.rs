//! Normalized signal model.
//!
//! Every supported modem reports its channel table in a different shape;
//! parsers convert those into the types here so that consumers never see
//! vendor formats.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Channel identifier as reported by the modem.
///
/// Opaque: modems number channels however they like, and the same number
/// can appear in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(String);

impl Channel {
    /// Creates a channel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Channel {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Channel {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Readings for one downstream (inbound) channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Downstream {
    /// Modulation, e.g. "QAM256" or "OFDM PLC".
    pub modulation: String,
    /// Center frequency, always formatted as "<integer> Hz".
    pub frequency: String,
    /// Power level in dBmV.
    pub power_level: f64,
    /// Signal-to-noise ratio in dB.
    pub snr: f64,
    /// Total unerrored codewords. Zero when the modem does not report it.
    pub unerrored: f64,
    /// Total correctable codewords.
    pub correctable: f64,
    /// Total uncorrectable codewords.
    pub uncorrectable: f64,
}

/// Readings for one upstream (outbound) channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    /// Modulation or channel type, e.g. "SC-QAM".
    pub modulation: String,
    /// Center frequency, always formatted as "<integer> Hz".
    pub frequency: String,
    /// Power level in dBmV.
    pub power_level: f64,
    /// Lock or ranging state, e.g. "Locked".
    pub status: String,
    /// Symbol rate in symbols per second. Zero when not reported.
    pub symbol_rate: f64,
    /// Ranging service id. Empty when not reported.
    pub ranging_service: String,
}

/// One snapshot of every channel the modem reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Downstream channels by channel id.
    pub downstream: BTreeMap<Channel, Downstream>,
    /// Upstream channels by channel id.
    pub upstream: BTreeMap<Channel, Upstream>,
}

impl Signal {
    /// Returns true if neither direction reported a channel.
    pub fn is_empty(&self) -> bool {
        self.downstream.is_empty() && self.upstream.is_empty()
    }
}
