//! Domain types for the trading dashboard

pub mod cell;
pub mod day;
pub mod ids;
pub mod user;

pub use cell::{column_text, Attributes, Cell, RichCell};
pub use day::{PositionRecord, RawDay, Record, StrategyRecord};
pub use ids::DayId;
pub use user::{AccessType, DbConfig, FieldLabels, User, UserConfig, UserRegistry};
