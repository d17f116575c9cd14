//! ARRIS SURFboard S33.
//!
//! The S33 serves its management UI over HTTPS with a self-signed ARRIS
//! certificate and reports channel tables through HNAP after a
//! challenge-response login. Both tables arrive as delimited strings.

use super::registry::{contains, ModemDescriptor};
use super::{Modem, ModemConfig, Source};
use crate::error::Result;
use crate::hnap::{self, Authenticator, StatusEnvelope};
use crate::parse::delimited::parse_table;
use crate::parse::{Column, DownstreamField, TableLayout, Unit, UpstreamField};
use crate::signal::{Downstream, Signal, Upstream};
use crate::transport::{endpoint, HttpTransport};
use async_trait::async_trait;
use reqwest::Url;
use tokio_util::sync::CancellationToken;

/// Model name.
pub const NAME: &str = "S33";

/// Signature on the login page.
const MODEL_MARKER: &[u8] = br#"<span id="thisModelNumberIs"> S33 </span>"#;

/// Signature of a captured status reply.
const ENVELOPE_MARKER: &[u8] = br#""GetMultipleHNAPsResponse""#;

static DOWNSTREAM: TableLayout<DownstreamField> = TableLayout {
    name: "downstream",
    min_rows: 1,
    columns: &[
        Column::Skip("channel"),
        Column::Skip("lock status"),
        Column::Set(DownstreamField::Modulation),
        Column::Id,
        Column::Set(DownstreamField::Frequency(Unit::Hz)),
        Column::Set(DownstreamField::PowerLevel),
        Column::Set(DownstreamField::Snr),
        Column::Set(DownstreamField::Correctable),
        Column::Set(DownstreamField::Uncorrectable),
    ],
};

static UPSTREAM: TableLayout<UpstreamField> = TableLayout {
    name: "upstream",
    min_rows: 3,
    columns: &[
        Column::Skip("channel entry"),
        Column::Set(UpstreamField::Status),
        Column::Set(UpstreamField::Modulation),
        Column::Id,
        Column::Skip("width"),
        Column::Set(UpstreamField::Frequency(Unit::Hz)),
        Column::Set(UpstreamField::PowerLevel),
    ],
};

/// Registry entry for the S33.
pub fn descriptor() -> ModemDescriptor {
    ModemDescriptor {
        name: NAME,
        identify_url,
        probe,
        construct,
    }
}

fn identify_url(config: &ModemConfig) -> Result<Url> {
    endpoint(&config.base_url, "/")
}

/// True for the S33 login page or a captured S33 status reply.
pub fn probe(content: &[u8]) -> bool {
    contains(content, MODEL_MARKER) || contains(content, ENVELOPE_MARKER)
}

fn construct(source: Source) -> Box<dyn Modem> {
    Box::new(S33 { source })
}

/// An S33 bound to a live modem or a captured status reply.
#[derive(Debug)]
pub struct S33 {
    source: Source,
}

impl S33 {
    /// An S33 reached through `config`.
    pub fn new(config: ModemConfig) -> Self {
        Self {
            source: Source::Live(config),
        }
    }

    /// An S33 that replays a captured status reply.
    pub fn from_capture(content: impl Into<std::sync::Arc<[u8]>>) -> Self {
        Self {
            source: Source::Fixture(content.into()),
        }
    }

    async fn fetch(config: &ModemConfig, cancel: &CancellationToken) -> Result<StatusEnvelope> {
        let transport = HttpTransport::new(config.timeout)?;
        let authenticator = Authenticator::new(
            endpoint(&config.base_url, hnap::HNAP_PATH)?,
            config.username.as_str(),
            config.password.as_str(),
        );
        let session = authenticator.authenticate(transport, cancel).await?;
        hnap::fetch_status(&session, cancel).await
    }
}

#[async_trait]
impl Modem for S33 {
    fn name(&self) -> &str {
        NAME
    }

    async fn status(&self, cancel: &CancellationToken) -> Result<Signal> {
        let envelope = match &self.source {
            Source::Fixture(content) => hnap::decode_envelope(content)?,
            Source::Live(config) => Self::fetch(config, cancel).await?,
        };
        parse_status(&envelope)
    }
}

/// Normalizes both channel tables of a status reply.
pub fn parse_status(envelope: &StatusEnvelope) -> Result<Signal> {
    Ok(Signal {
        downstream: parse_table::<Downstream>(envelope.downstream(), &DOWNSTREAM)?,
        upstream: parse_table::<Upstream>(envelope.upstream(), &UPSTREAM)?,
    })
}
