//! Name-keyed searcher registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::generic::GenericSearcher;
use super::search::ChannelSearcher;
use super::tonkiang::TonkiangSearcher;
use super::{SearchContext, Searcher};
use crate::config::SearchConfig;
use crate::error_handling::SearcherError;

/// Builds a searcher plugin from the run's search configuration.
pub type SearcherConstructor =
    Arc<dyn Fn(&SearchConfig) -> Result<Box<dyn Searcher>, SearcherError> + Send + Sync>;

/// Maps searcher names to constructors.
///
/// Starts empty; registration is an explicit step performed before the first
/// lookup (see [`register_builtin_searchers`]).
#[derive(Clone, Default)]
pub struct SearcherRegistry {
    constructors: BTreeMap<String, SearcherConstructor>,
}

impl SearcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in searchers registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        register_builtin_searchers(&mut registry);
        registry
    }

    /// Registers `constructor` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&SearchConfig) -> Result<Box<dyn Searcher>, SearcherError> + Send + Sync + 'static,
    {
        if self
            .constructors
            .insert(name.to_string(), Arc::new(constructor))
            .is_some()
        {
            log::warn!("Searcher '{}' re-registered", name);
        } else {
            log::debug!("Searcher registered: {}", name);
        }
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Constructs the searcher registered as `name`, runs its `setup` once and
    /// wraps it in the shared search orchestration.
    ///
    /// # Errors
    ///
    /// `SearcherError::NotFound` (listing the registered names) for an unknown
    /// name, or whatever the constructor or `setup` report.
    pub async fn create(
        &self,
        name: &str,
        config: SearchConfig,
        ctx: SearchContext,
    ) -> Result<ChannelSearcher, SearcherError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| SearcherError::NotFound {
                name: name.to_string(),
                known: self.list(),
            })?;

        let mut site = constructor(&config)?;
        site.setup().await?;
        log::info!("Searcher '{}' ready ({})", name, site.base_url());
        Ok(ChannelSearcher::new(Arc::from(site), config, ctx))
    }
}

/// Registers the built-in `tonkiang` and `generic` searchers.
pub fn register_builtin_searchers(registry: &mut SearcherRegistry) {
    registry.register(TonkiangSearcher::NAME, |config| {
        Ok(Box::new(TonkiangSearcher::new(config)?) as Box<dyn Searcher>)
    });
    registry.register(GenericSearcher::NAME, |config| {
        Ok(Box::new(GenericSearcher::new(config)?) as Box<dyn Searcher>)
    });
}
