//! In-memory store of fetched trading days.
//!
//! `DayStore::build` performs the initial load in a fixed order (index, the
//! latest day, metrics), so a view model can be built as soon as it returns.
//! Older days are fetched on demand with [`DayStore::load_history`].

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use super::source::{FetchError, JsonSource};
use crate::config::{CachePolicy, DashboardConfig, DataPaths};
use crate::domain::{DayId, RawDay, Record, User};
use crate::error::BuildError;
use crate::viewmodel::{ViewModel, ViewModelBuilder};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("invalid {document}: {reason}")]
    Invalid { document: String, reason: String },
}

/// Day index, fetched day records, and the metrics table.
#[derive(Debug, Clone, Default)]
pub struct DayStore {
    index: Vec<DayId>,
    days: BTreeMap<DayId, RawDay>,
    metrics: Vec<Record>,
    paths: DataPaths,
    cache: CachePolicy,
}

impl DayStore {
    /// Assemble a store from already-loaded parts.
    pub fn from_parts(index: Vec<DayId>, days: Vec<RawDay>, metrics: Vec<Record>) -> Self {
        Self {
            index,
            days: days.into_iter().map(|day| (day.id.clone(), day)).collect(),
            metrics,
            paths: DataPaths::default(),
            cache: CachePolicy::default(),
        }
    }

    /// Fetch the day index, the latest day, and the metrics table.
    pub fn build(source: &dyn JsonSource, config: &DashboardConfig) -> Result<Self, StoreError> {
        let paths = config.paths.clone();
        let cache = config.cache;

        let index_doc = source.fetch_json(&paths.index, cache.bust_index)?;
        let index: Vec<DayId> = decode(&paths.index, index_doc)?;

        let mut store = Self {
            index,
            days: BTreeMap::new(),
            metrics: Vec::new(),
            paths,
            cache,
        };

        if let Some(today) = store.index.first().cloned() {
            store.fetch_day(source, &today)?;
        } else {
            log::warn!("day index from {} is empty", source.name());
        }

        let metrics_doc = source.fetch_json(&store.paths.metrics, cache.bust_metrics)?;
        store.metrics = decode(&store.paths.metrics, metrics_doc)?;

        log::info!(
            "loaded {} day(s) of {} indexed, {} metrics rows from {}",
            store.days.len(),
            store.index.len(),
            store.metrics.len(),
            source.name()
        );
        Ok(store)
    }

    /// Like [`DayStore::build`], but a failed load is logged and reported as
    /// "no data yet" instead of an error.
    pub fn try_build(source: &dyn JsonSource, config: &DashboardConfig) -> Option<Self> {
        match Self::build(source, config) {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("trading data unavailable from {}: {e}", source.name());
                None
            }
        }
    }

    /// Fetch every indexed day not yet loaded, if history loading is enabled
    /// for `user` (falling back to `default`). Days that fail to load are
    /// logged and skipped. Returns how many days were added.
    pub fn load_history(&mut self, source: &dyn JsonSource, user: &User, default: bool) -> usize {
        if !user.config.db.loadhistory.unwrap_or(default) {
            return 0;
        }

        let pending: Vec<DayId> = self
            .index
            .iter()
            .skip(1)
            .filter(|id| !self.days.contains_key(*id))
            .cloned()
            .collect();

        let mut loaded = 0;
        for id in pending {
            match self.fetch_day(source, &id) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("skipping day {id}: {e}"),
            }
        }
        loaded
    }

    fn fetch_day(&mut self, source: &dyn JsonSource, id: &DayId) -> Result<(), StoreError> {
        let doc = source.fetch_json(&self.paths.day(id), self.cache.bust_days)?;
        let day = RawDay::from_value(id.clone(), &doc)?;
        self.days.insert(id.clone(), day);
        Ok(())
    }

    /// The latest trading day.
    pub fn today(&self) -> Option<&DayId> {
        self.index.first()
    }

    pub fn index(&self) -> &[DayId] {
        &self.index
    }

    pub fn metrics(&self) -> &[Record] {
        &self.metrics
    }

    pub fn day(&self, id: &DayId) -> Option<&RawDay> {
        self.days.get(id)
    }

    pub fn days_loaded(&self) -> usize {
        self.days.len()
    }

    pub fn builder(&self) -> ViewModelBuilder<'_> {
        ViewModelBuilder::new(&self.index, &self.metrics)
    }

    /// Build the view model of a loaded day.
    pub fn view(&self, id: &DayId, user: &User) -> Result<ViewModel, BuildError> {
        let day = self
            .day(id)
            .ok_or_else(|| BuildError::DayNotFound { day: id.clone() })?;
        self.builder().build(day, user)
    }
}

fn decode<T: serde::de::DeserializeOwned>(document: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Invalid {
        document: document.to_string(),
        reason: e.to_string(),
    })
}
