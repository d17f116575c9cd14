//! Motorola SURFboard SB6121.
//!
//! The SB6121 needs no login: its signal page is plain HTTP and lays out
//! three tables (downstream, upstream, codeword counters) with one column
//! per channel.

use super::registry::{contains, ModemDescriptor};
use super::{Modem, ModemConfig, Source};
use crate::error::{Error, Result};
use crate::parse::html::{parse_table, top_level_tables};
use crate::parse::{Column, DownstreamField, TableLayout, Unit, UpstreamField};
use crate::signal::{Downstream, Signal, Upstream};
use crate::transport::{endpoint, HttpTransport};
use async_trait::async_trait;
use reqwest::Url;
use scraper::Html;
use tokio_util::sync::CancellationToken;

/// Model name.
pub const NAME: &str = "SB6121";

/// Path of the signal page.
pub const SIGNAL_PATH: &str = "/cmSignalData.htm";

const TITLE_MARKER: &[u8] = b"<title>signal</title>";
const CODEWORDS_MARKER: &[u8] = b"Signal Stats (Codewords)";

static DOWNSTREAM: TableLayout<DownstreamField> = TableLayout {
    name: "downstream",
    min_rows: 5,
    columns: &[
        Column::Id,
        Column::Set(DownstreamField::Frequency(Unit::Hz)),
        Column::Set(DownstreamField::Snr),
        Column::Set(DownstreamField::Modulation),
        Column::Set(DownstreamField::PowerLevel),
    ],
};

static UPSTREAM: TableLayout<UpstreamField> = TableLayout {
    name: "upstream",
    min_rows: 7,
    columns: &[
        Column::Id,
        Column::Set(UpstreamField::Frequency(Unit::Hz)),
        Column::Set(UpstreamField::RangingService),
        Column::Set(UpstreamField::SymbolRate(Unit::MHz)),
        Column::Set(UpstreamField::PowerLevel),
        Column::Set(UpstreamField::Modulation),
        Column::Set(UpstreamField::Status),
    ],
};

static CODEWORDS: TableLayout<DownstreamField> = TableLayout {
    name: "codewords",
    min_rows: 4,
    columns: &[
        Column::Id,
        Column::Set(DownstreamField::Unerrored),
        Column::Set(DownstreamField::Correctable),
        Column::Set(DownstreamField::Uncorrectable),
    ],
};

/// Registry entry for the SB6121.
pub fn descriptor() -> ModemDescriptor {
    ModemDescriptor {
        name: NAME,
        identify_url: signal_url,
        probe,
        construct,
    }
}

/// The signal page is only served over plain HTTP.
fn signal_url(config: &ModemConfig) -> Result<Url> {
    let base = match config.base_url.strip_prefix("https://") {
        Some(host) => format!("http://{}", host),
        None => config.base_url.clone(),
    };
    endpoint(&base, SIGNAL_PATH)
}

/// True for the SB6121 signal page.
pub fn probe(content: &[u8]) -> bool {
    contains(&content.to_ascii_lowercase(), TITLE_MARKER) && contains(content, CODEWORDS_MARKER)
}

fn construct(source: Source) -> Box<dyn Modem> {
    Box::new(Sb6121 { source })
}

/// An SB6121 bound to a live modem or a captured signal page.
#[derive(Debug)]
pub struct Sb6121 {
    source: Source,
}

impl Sb6121 {
    /// An SB6121 reached through `config`.
    pub fn new(config: ModemConfig) -> Self {
        Self {
            source: Source::Live(config),
        }
    }

    /// An SB6121 that replays a captured signal page.
    pub fn from_capture(content: impl Into<std::sync::Arc<[u8]>>) -> Self {
        Self {
            source: Source::Fixture(content.into()),
        }
    }
}

#[async_trait]
impl Modem for Sb6121 {
    fn name(&self) -> &str {
        NAME
    }

    async fn status(&self, cancel: &CancellationToken) -> Result<Signal> {
        let page = match &self.source {
            Source::Fixture(content) => content.to_vec(),
            Source::Live(config) => {
                let transport = HttpTransport::new(config.timeout)?;
                transport
                    .get_page(&signal_url(config)?, config.probe_limit, cancel)
                    .await?
            }
        };
        parse_page(&String::from_utf8_lossy(&page))
    }
}

/// Normalizes the three tables of a signal page.
pub fn parse_page(page: &str) -> Result<Signal> {
    let document = Html::parse_document(page);
    let tables = top_level_tables(&document);
    if tables.len() < 2 {
        return Err(Error::Decode(format!(
            "expected downstream and upstream tables, found {}",
            tables.len()
        )));
    }

    let mut downstream = parse_table::<Downstream>(tables[0], &DOWNSTREAM)?;
    let upstream = parse_table::<Upstream>(tables[1], &UPSTREAM)?;

    match tables.get(2) {
        Some(table) => {
            let codewords = parse_table::<Downstream>(*table, &CODEWORDS)?;
            for (channel, counts) in codewords {
                let record = downstream.entry(channel).or_default();
                record.unerrored = counts.unerrored;
                record.correctable = counts.correctable;
                record.uncorrectable = counts.uncorrectable;
            }
        }
        None => tracing::debug!("No codeword table on signal page"),
    }

    Ok(Signal {
        downstream,
        upstream,
    })
}
