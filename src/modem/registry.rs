//! Model registry and probe dispatch.

use super::{s33, sb6121, Modem, ModemConfig, Source};
use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use reqwest::Url;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything the registry needs to recognize and build one model.
#[derive(Clone, Copy)]
pub struct ModemDescriptor {
    /// Model name, as returned by [`Modem::name`].
    pub name: &'static str,
    /// Page fetched when probing a live modem.
    pub identify_url: fn(&ModemConfig) -> Result<Url>,
    /// True if the content carries this model's signature.
    pub probe: fn(&[u8]) -> bool,
    /// Builds an instance bound to a data source.
    pub construct: fn(Source) -> Box<dyn Modem>,
}

impl fmt::Debug for ModemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModemDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered set of known models. First match wins.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    models: Vec<ModemDescriptor>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every model this crate supports.
    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        registry.register(s33::descriptor());
        registry.register(sb6121::descriptor());
        registry
    }

    /// Appends a model. Earlier registrations take precedence.
    pub fn register(&mut self, descriptor: ModemDescriptor) {
        tracing::debug!(model = descriptor.name, "Registered modem model");
        self.models.push(descriptor);
    }

    /// Registered model names in precedence order.
    pub fn names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.name).collect()
    }

    /// First model whose probe accepts `content`.
    pub fn match_content(&self, content: &[u8]) -> Option<&ModemDescriptor> {
        self.models.iter().find(|m| (m.probe)(content))
    }

    /// Determines which model `config` points at and returns an instance.
    ///
    /// With a fixture configured, the file is read once and offered to each
    /// probe. Otherwise each model's identification page is fetched (pages
    /// shared by several models are fetched once) and probed. A failed
    /// fetch only rules out the models that depend on it.
    pub async fn identify(
        &self,
        config: &ModemConfig,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Modem>> {
        if let Some(path) = &config.fixture {
            let content: Arc<[u8]> = tokio::fs::read(path).await?.into();
            return match self.match_content(&content) {
                Some(model) => {
                    tracing::info!(model = model.name, fixture = %path.display(), "Identified modem from fixture");
                    Ok((model.construct)(Source::Fixture(content)))
                }
                None => Err(Error::NoMatch),
            };
        }

        let transport = HttpTransport::new(config.timeout)?;
        let mut pages: HashMap<Url, Option<Vec<u8>>> = HashMap::new();

        for model in &self.models {
            let url = (model.identify_url)(config)?;
            if !pages.contains_key(&url) {
                tracing::info!(model = model.name, %url, "Probing");
                let page = match transport.get_limited(&url, config.probe_limit, cancel).await {
                    Ok(body) => Some(body),
                    Err(Error::Cancelled) => return Err(Error::Cancelled),
                    Err(e) => {
                        tracing::warn!(model = model.name, %url, error = %e, "Probe request failed");
                        None
                    }
                };
                pages.insert(url.clone(), page);
            }

            if let Some(Some(page)) = pages.get(&url) {
                if (model.probe)(page) {
                    tracing::info!(model = model.name, "Identified modem");
                    return Ok((model.construct)(Source::Live(config.clone())));
                }
            }
        }

        Err(Error::NoMatch)
    }
}

/// Byte-wise substring search.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
