//! Tradeboard core: domain types, data retrieval, and view-model shaping.
//!
//! This crate turns raw trading-day records into per-component view models:
//! - Domain types (raw days, users and entitlements, slot cells)
//! - `ViewModelBuilder`: entitlement filtering and component shaping
//! - Data sources (HTTP and local directory) and the day store
//! - TOML dashboard configuration
//! - The Lookup / Shape / Configuration error taxonomy

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod viewmodel;

pub use config::{CachePolicy, ConfigError, DashboardConfig, DataPaths};
pub use data::{DayStore, DirSource, FetchError, HttpSource, JsonSource, StoreError};
pub use domain::{
    AccessType, Attributes, Cell, DayId, FieldLabels, RawDay, Record, RichCell, User, UserRegistry,
};
pub use error::{BuildError, ErrorKind};
pub use viewmodel::{
    components, ComponentModel, GridModel, ViewEntry, ViewModel, ViewModelBuilder, TRADE_ACTIONS,
};
