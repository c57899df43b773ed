//! Raw trading-day records.
//!
//! A day file is a positional array-of-arrays:
//!
//! ```text
//! [ date, [strategy...], [component...], [market...], calendar ]
//! ```
//!
//! The outer shape is checked when the record is parsed. Individual rows are
//! only checked when a view model reads them, so a day with a bad market row
//! can still be stored and inspected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cell::column_text;
use super::ids::DayId;
use crate::error::BuildError;

/// One positional row of a raw record.
pub type Record = Vec<Value>;

/// Minimum columns of a strategy row: key, id, name, action, general
/// message, detailed message, positions.
pub const STRATEGY_COLUMNS: usize = 7;
/// Minimum columns of a position row (gain lives in the last one).
pub const POSITION_COLUMNS: usize = 10;
/// Exact columns of a market row: id, symbol, open, high, low, close,
/// change, change percent.
pub const MARKET_COLUMNS: usize = 8;
/// Minimum columns of a metrics row: key, strategy id.
pub const METRICS_COLUMNS: usize = 2;

const DAY_SECTIONS: usize = 5;

/// One day's record as fetched from the data source. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDay {
    pub id: DayId,
    pub date: String,
    pub strategies: Vec<Record>,
    pub components: Vec<Record>,
    pub markets: Vec<Record>,
    pub calendar: Value,
}

impl RawDay {
    /// Parse the positional day document fetched for `id`.
    pub fn from_value(id: DayId, value: &Value) -> Result<Self, BuildError> {
        let sections = value
            .as_array()
            .ok_or_else(|| BuildError::malformed("day", 0, "day record is not an array"))?;
        if sections.len() < DAY_SECTIONS {
            return Err(BuildError::shape("day", 0, DAY_SECTIONS, sections.len()));
        }

        Ok(Self {
            id,
            date: column_text(&sections[0]),
            strategies: rows("strategy", &sections[1])?,
            components: rows("component", &sections[2])?,
            markets: rows("market", &sections[3])?,
            calendar: sections[4].clone(),
        })
    }
}

fn rows(record: &'static str, section: &Value) -> Result<Vec<Record>, BuildError> {
    let list = section
        .as_array()
        .ok_or_else(|| BuildError::malformed(record, 0, "section is not an array"))?;
    list.iter()
        .enumerate()
        .map(|(i, row)| {
            row.as_array()
                .cloned()
                .ok_or_else(|| BuildError::malformed(record, i, "row is not an array"))
        })
        .collect()
}

/// Strategy id column of a strategy or metrics row.
pub fn strategy_id(row: &Record) -> Option<String> {
    row.get(1).map(column_text)
}

/// Symbol column of a market row.
pub fn market_symbol(row: &Record) -> Option<String> {
    row.get(1).map(column_text)
}

/// Typed view of one strategy row.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRecord {
    pub id: String,
    pub name: String,
    pub action: String,
    pub general_message: String,
    pub detailed_message: String,
    pub position: PositionRecord,
}

impl StrategyRecord {
    pub fn parse(index: usize, row: &Record) -> Result<Self, BuildError> {
        if row.len() < STRATEGY_COLUMNS {
            return Err(BuildError::shape("strategy", index, STRATEGY_COLUMNS, row.len()));
        }
        let positions = row[6]
            .as_array()
            .ok_or_else(|| BuildError::malformed("strategy", index, "positions is not an array"))?;
        let current = positions
            .first()
            .ok_or_else(|| BuildError::malformed("strategy", index, "no position rows"))?;
        let current = current
            .as_array()
            .ok_or_else(|| BuildError::malformed("position", index, "row is not an array"))?;

        Ok(Self {
            id: column_text(&row[1]),
            name: column_text(&row[2]),
            action: column_text(&row[3]),
            general_message: column_text(&row[4]),
            detailed_message: column_text(&row[5]),
            position: PositionRecord::parse(index, current)?,
        })
    }
}

/// The open position of a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    pub entry_date: String,
    pub duration: String,
    pub gain: String,
    pub gain_value: f64,
}

impl PositionRecord {
    fn parse(index: usize, row: &[Value]) -> Result<Self, BuildError> {
        if row.len() < POSITION_COLUMNS {
            return Err(BuildError::shape("position", index, POSITION_COLUMNS, row.len()));
        }
        let gain_value = match &row[9] {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        };
        Ok(Self {
            entry_date: column_text(&row[5]),
            duration: column_text(&row[6]),
            gain: column_text(&row[9]),
            gain_value,
        })
    }

    /// `+` for a strictly positive gain, `-` otherwise.
    pub fn sign(&self) -> &'static str {
        if self.gain_value > 0.0 {
            "+"
        } else {
            "-"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn position(gain: Value) -> Value {
        json!(["p", "id1", "SPY", 10, 420.5, "2021-06-01", "41 days", 430.1, 0.02, gain])
    }

    #[test]
    fn parses_positional_day() {
        let doc = json!([
            "2021-07-12",
            [["S1", "id1", "US Equities", "Hold", "msg", "detail", [position(json!(1.5))]]],
            [],
            [["m1", "SPX", 4300.0, 4310.0, 4290.0, 4305.0, 5.0, 0.12]],
            {"holiday": false}
        ]);
        let day = RawDay::from_value(DayId::new("0"), &doc).unwrap();
        assert_eq!(day.date, "2021-07-12");
        assert_eq!(day.strategies.len(), 1);
        assert_eq!(market_symbol(&day.markets[0]).as_deref(), Some("SPX"));
    }

    #[test]
    fn short_day_is_shape_error() {
        let err = RawDay::from_value(DayId::new("0"), &json!(["2021-07-12", []])).unwrap_err();
        assert_eq!(err, BuildError::shape("day", 0, 5, 2));
    }

    #[test]
    fn strategy_record_reads_current_position() {
        let row = json!(["S1", "id1", "US Equities", "Enter", "g", "d", [position(json!(-2))]]);
        let strategy = StrategyRecord::parse(0, row.as_array().unwrap()).unwrap();
        assert_eq!(strategy.action, "Enter");
        assert_eq!(strategy.position.entry_date, "2021-06-01");
        assert_eq!(strategy.position.duration, "41 days");
        assert_eq!(strategy.position.gain, "-2");
        assert_eq!(strategy.position.sign(), "-");
    }

    #[test]
    fn textual_gain_is_numeric() {
        let row = json!(["S1", "id1", "n", "Hold", "g", "d", [position(json!("3.25"))]]);
        let strategy = StrategyRecord::parse(0, row.as_array().unwrap()).unwrap();
        assert_eq!(strategy.position.sign(), "+");
    }

    #[test]
    fn zero_gain_is_negative_sign() {
        let row = json!(["S1", "id1", "n", "Hold", "g", "d", [position(json!(0))]]);
        let strategy = StrategyRecord::parse(0, row.as_array().unwrap()).unwrap();
        assert_eq!(strategy.position.sign(), "-");
    }

    #[test]
    fn strategy_without_position_is_rejected() {
        let row = json!(["S1", "id1", "n", "Hold", "g", "d", []]);
        let err = StrategyRecord::parse(4, row.as_array().unwrap()).unwrap_err();
        assert!(matches!(err, BuildError::Malformed { index: 4, .. }));
    }
}
