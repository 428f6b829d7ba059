//! Cadence - interval ordering and caching for sequence diagram models.
//!
//! Cadence answers the questions a sequence diagram editor keeps asking while
//! the user edits: which events exist, in which vertical order, which event
//! contains which, which lifelines a fragment covers, and which message starts
//! or ends an execution. Answers are memoized per diagram and invalidated by
//! edit notifications.

pub mod config;
pub mod model;

mod cache;
mod collection;
mod diagram;
mod error;
mod range;

pub use cadence_core::{event, geometry, identifier, ordering};

pub use cache::{CacheStats, EventSet, IdList};
pub use collection::Collection;
pub use diagram::SequenceDiagram;
pub use error::{CadenceError, Result};
pub use range::OrderKey;

use log::info;

use cadence_core::ordering::GraphicalOrderingProvider;

use config::AppConfig;
use model::ModelAccessor;

/// Builder for diagram sessions.
///
/// A session is one [`SequenceDiagram`] configured from an [`AppConfig`]: its
/// cache toggles start as the configuration says.
///
/// # Examples
///
/// ```rust
/// use cadence::{SessionBuilder, config::{AppConfig, CacheConfig}, model::SequenceModel};
///
/// let config = AppConfig::new(CacheConfig::enabled());
/// let diagram = SessionBuilder::new(config).build(SequenceModel::default());
///
/// assert!(diagram.is_cache_enabled());
/// assert!(diagram.all_messages().is_empty());
/// ```
#[derive(Default)]
pub struct SessionBuilder {
    config: AppConfig,
    ordering: Option<Box<dyn GraphicalOrderingProvider>>,
}

impl SessionBuilder {
    /// Create a new session builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ordering: None,
        }
    }

    /// Use `ordering` as the graphical ordering of the session.
    pub fn with_ordering(mut self, ordering: impl GraphicalOrderingProvider + 'static) -> Self {
        self.ordering = Some(Box::new(ordering));
        self
    }

    /// Build a diagram session over `model`.
    pub fn build<M: ModelAccessor>(self, model: M) -> SequenceDiagram<M> {
        let cache = *self.config.cache();
        info!(
            collections = cache.collections(),
            structural = cache.structural(),
            range = cache.range();
            "Building diagram session"
        );

        let diagram = SequenceDiagram::with_cache_config(model, cache);
        match self.ordering {
            Some(ordering) => diagram.with_boxed_ordering(ordering),
            None => diagram,
        }
    }
}
