//! Data retrieval and the trading-day store

pub mod source;
pub mod store;

pub use source::{request_url, DirSource, FetchError, HttpSource, JsonSource};
pub use store::{DayStore, StoreError};
