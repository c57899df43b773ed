//! View-model shaping: raw trading day + user entitlements -> per-component data.
//!
//! The builder is the only place entitlement filtering happens. Everything it
//! emits is already restricted to the user's strategies and markets, so the
//! renderer never has to look at a [`User`]'s entitlements again.
//!
//! Output per component:
//! - `market-status`: one grid, parent = date, child = entitled market rows
//!   without their leading id column
//! - `strategy-alert`: one grid, parent = headline/phrase/date, child = one
//!   row per entitled strategy
//! - `strategy-status`: one grid per entitled strategy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;

use crate::domain::day::{
    market_symbol, strategy_id, MARKET_COLUMNS, METRICS_COLUMNS, STRATEGY_COLUMNS,
};
use crate::domain::{column_text, Cell, DayId, RawDay, Record, RichCell, StrategyRecord, User};
use crate::error::BuildError;

/// Component names produced by the builder.
pub mod components {
    pub const MARKET_STATUS: &str = "market-status";
    pub const STRATEGY_ALERT: &str = "strategy-alert";
    pub const STRATEGY_STATUS: &str = "strategy-status";
}

/// Strategy actions that count as a new trade.
pub const TRADE_ACTIONS: [&str; 4] = ["Enter", "Exit", "Rollover", "Switch"];

const LIVE_PREFIX: &str = "[Live] ";

/// A grid component's data: one parent row plus repeated child rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridModel {
    pub parent: Vec<Cell>,
    pub child: Vec<Vec<Cell>>,
}

impl GridModel {
    pub fn new(parent: Vec<Cell>, child: Vec<Vec<Cell>>) -> Self {
        Self { parent, child }
    }

    /// Number of bound elements a projection of this grid produces.
    pub fn cell_count(&self) -> usize {
        self.parent.len() + self.child.iter().map(Vec::len).sum::<usize>()
    }
}

/// Data for one component instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentModel {
    Grid(GridModel),
    Flat(Vec<Cell>),
}

impl ComponentModel {
    pub fn flat<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        ComponentModel::Flat(cells.into_iter().map(Into::into).collect())
    }

    pub fn as_grid(&self) -> Option<&GridModel> {
        match self {
            ComponentModel::Grid(grid) => Some(grid),
            ComponentModel::Flat(_) => None,
        }
    }

    pub fn as_flat(&self) -> Option<&[Cell]> {
        match self {
            ComponentModel::Flat(cells) => Some(cells),
            ComponentModel::Grid(_) => None,
        }
    }
}

impl From<GridModel> for ComponentModel {
    fn from(grid: GridModel) -> Self {
        ComponentModel::Grid(grid)
    }
}

/// A component rendered once, or once per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewEntry {
    Single(ComponentModel),
    Repeated(Vec<ComponentModel>),
}

impl ViewEntry {
    /// Every model in render order.
    pub fn models(&self) -> &[ComponentModel] {
        match self {
            ViewEntry::Single(model) => std::slice::from_ref(model),
            ViewEntry::Repeated(models) => models,
        }
    }
}

/// Everything needed to render one trading day for one user.
///
/// Built fresh per render pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub day: DayId,
    pub date: String,
    pub new_trades: bool,
    pub components: BTreeMap<String, ViewEntry>,
    /// Metrics rows for the user's strategies.
    pub metrics: Vec<Record>,
}

impl ViewModel {
    pub fn get(&self, component: &str) -> Option<&ViewEntry> {
        self.components.get(component)
    }

    /// The single model of `component`, if it is rendered once.
    pub fn component(&self, component: &str) -> Option<&ComponentModel> {
        match self.components.get(component)? {
            ViewEntry::Single(model) => Some(model),
            ViewEntry::Repeated(_) => None,
        }
    }

    /// The models of `component` in render order; empty if absent.
    pub fn models(&self, component: &str) -> &[ComponentModel] {
        self.components
            .get(component)
            .map(ViewEntry::models)
            .unwrap_or(&[])
    }
}

impl Index<&str> for ViewModel {
    type Output = ViewEntry;

    fn index(&self, component: &str) -> &ViewEntry {
        self.components
            .get(component)
            .unwrap_or_else(|| panic!("no component '{component}' in view model"))
    }
}

/// Shapes raw days into view models against a day index and metrics table.
#[derive(Debug, Clone, Copy)]
pub struct ViewModelBuilder<'a> {
    index: &'a [DayId],
    metrics: &'a [Record],
}

impl<'a> ViewModelBuilder<'a> {
    pub fn new(index: &'a [DayId], metrics: &'a [Record]) -> Self {
        Self { index, metrics }
    }

    /// Build the view model of `day` for `user`.
    ///
    /// Fails with [`BuildError::DayNotFound`] when `day` is not in the index,
    /// and with a shape error when any strategy, market or metrics row is too
    /// short to read.
    pub fn build(&self, day: &RawDay, user: &User) -> Result<ViewModel, BuildError> {
        if !self.index.contains(&day.id) {
            return Err(BuildError::DayNotFound {
                day: day.id.clone(),
            });
        }

        let strategies = entitled_strategies(day, user)?;
        let markets = entitled_markets(day, user)?;
        let metrics = entitled_metrics(self.metrics, user)?;
        let new_trades = has_new_trades(&strategies);

        let mut components = BTreeMap::new();
        components.insert(
            components::MARKET_STATUS.to_string(),
            ViewEntry::Single(market_status(&day.date, markets).into()),
        );
        components.insert(
            components::STRATEGY_ALERT.to_string(),
            ViewEntry::Single(strategy_alert(&day.date, new_trades, &strategies, user).into()),
        );
        components.insert(
            components::STRATEGY_STATUS.to_string(),
            ViewEntry::Repeated(
                strategies
                    .iter()
                    .map(|strategy| strategy_status(strategy).into())
                    .collect(),
            ),
        );

        log::debug!(
            "built view model for day {} ({} strategies, new trades: {new_trades})",
            day.id,
            strategies.len()
        );

        Ok(ViewModel {
            day: day.id.clone(),
            date: day.date.clone(),
            new_trades,
            components,
            metrics,
        })
    }
}

/// True iff any strategy's action is one of [`TRADE_ACTIONS`].
pub fn has_new_trades(strategies: &[StrategyRecord]) -> bool {
    strategies
        .iter()
        .any(|strategy| TRADE_ACTIONS.contains(&strategy.action.as_str()))
}

/// Column counts are checked on every row; positions are only read for
/// rows the user is entitled to.
fn entitled_strategies(day: &RawDay, user: &User) -> Result<Vec<StrategyRecord>, BuildError> {
    let mut strategies = Vec::new();
    for (i, row) in day.strategies.iter().enumerate() {
        if row.len() < STRATEGY_COLUMNS {
            return Err(BuildError::shape("strategy", i, STRATEGY_COLUMNS, row.len()));
        }
        if strategy_id(row).is_some_and(|id| user.strategy_ids.contains(&id)) {
            strategies.push(StrategyRecord::parse(i, row)?);
        }
    }
    Ok(strategies)
}

fn entitled_markets(day: &RawDay, user: &User) -> Result<Vec<Record>, BuildError> {
    let mut markets = Vec::new();
    for (i, row) in day.markets.iter().enumerate() {
        if row.len() != MARKET_COLUMNS {
            return Err(BuildError::shape("market", i, MARKET_COLUMNS, row.len()));
        }
        if market_symbol(row).is_some_and(|symbol| user.market_symbols.contains(&symbol)) {
            markets.push(row.clone());
        }
    }
    Ok(markets)
}

fn entitled_metrics(metrics: &[Record], user: &User) -> Result<Vec<Record>, BuildError> {
    let mut rows = Vec::new();
    for (i, row) in metrics.iter().enumerate() {
        if row.len() < METRICS_COLUMNS {
            return Err(BuildError::shape("metrics", i, METRICS_COLUMNS, row.len()));
        }
        if strategy_id(row).is_some_and(|id| user.strategy_ids.contains(&id)) {
            rows.push(row.clone());
        }
    }
    Ok(rows)
}

fn date_cell(date: &str) -> Cell {
    RichCell::new("time", date).attr("datetime", date).into()
}

fn market_status(date: &str, markets: Vec<Record>) -> GridModel {
    // The id column duplicates the slot name assigned at projection time.
    let child = markets
        .into_iter()
        .map(|row| row.iter().skip(1).map(|v| Cell::Text(column_text(v))).collect())
        .collect();
    GridModel::new(vec![date_cell(date)], child)
}

fn strategy_alert(
    date: &str,
    new_trades: bool,
    strategies: &[StrategyRecord],
    user: &User,
) -> GridModel {
    let (headline, phrase) = if new_trades {
        ("ACTION ALERT!", "There are new trades to execute on ")
    } else {
        ("No new trades today", "There are no new trades for ")
    };

    let child = strategies
        .iter()
        .map(|strategy| {
            let href = strategy.id.replace(LIVE_PREFIX, "");
            let message = if user.is_detailed() {
                &strategy.detailed_message
            } else {
                &strategy.general_message
            };
            vec![
                RichCell::new("a", strategy.name.as_str())
                    .attr("href", href)
                    .into(),
                Cell::text(strategy.action.as_str()),
                Cell::text(message.as_str()),
            ]
        })
        .collect();

    GridModel::new(
        vec![Cell::text(headline), Cell::text(phrase), date_cell(date)],
        child,
    )
}

fn strategy_status(strategy: &StrategyRecord) -> GridModel {
    let position = &strategy.position;
    let parent = vec![
        Cell::text(strategy.name.as_str()),
        RichCell::new("span", position.gain.as_str())
            .attr("data-sign", position.sign())
            .into(),
        RichCell::new("span", position.duration.as_str()).into(),
        RichCell::new("span", position.entry_date.as_str()).into(),
    ];
    GridModel::new(parent, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccessType;
    use serde_json::{json, Value};

    fn position(gain: f64) -> Value {
        json!(["p", "x", "SPY", 10, 420.5, "2021-06-01", "41 days", 430.1, 0.02, gain])
    }

    fn strategy(id: &str, name: &str, action: &str) -> Value {
        json!([
            "S",
            id,
            name,
            action,
            format!("{name}: general"),
            format!("{name}: detailed"),
            [position(1.5)]
        ])
    }

    fn market(id: &str, symbol: &str) -> Value {
        json!([id, symbol, 4300.0, 4310.0, 4290.0, 4305.0, 5.0, 0.12])
    }

    fn day(strategies: Vec<Value>, markets: Vec<Value>) -> RawDay {
        RawDay::from_value(
            DayId::new("2"),
            &json!(["2021-07-12", strategies, [], markets, {}]),
        )
        .unwrap()
    }

    fn index() -> Vec<DayId> {
        vec![DayId::new("2"), DayId::new("1"), DayId::new("0")]
    }

    fn basic_user() -> User {
        User::new(AccessType::Basic)
            .with_strategies(["id1"])
            .with_markets(["SPX"])
    }

    #[test]
    fn hold_only_day_has_no_new_trades() {
        let raw = day(vec![strategy("id1", "US Equities", "Hold")], vec![]);
        let index = index();
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        assert!(!view.new_trades);
        let alert = view.component(components::STRATEGY_ALERT).unwrap().as_grid().unwrap();
        assert_eq!(alert.parent[0], Cell::text("No new trades today"));
        assert_eq!(alert.parent[1], Cell::text("There are no new trades for "));
    }

    #[test]
    fn trade_action_raises_alert() {
        let raw = day(
            vec![
                strategy("id1", "US Equities", "Hold"),
                strategy("id2", "Speculative", "Switch"),
            ],
            vec![],
        );
        let index = index();
        let user = basic_user().with_strategies(["id2"]);
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &user).unwrap();
        assert!(view.new_trades);
        let alert = view.component(components::STRATEGY_ALERT).unwrap().as_grid().unwrap();
        assert_eq!(alert.parent[0], Cell::text("ACTION ALERT!"));
    }

    #[test]
    fn unentitled_trades_do_not_count() {
        let raw = day(
            vec![
                strategy("id1", "US Equities", "Hold"),
                strategy("id2", "Speculative", "Enter"),
            ],
            vec![],
        );
        let index = index();
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        assert!(!view.new_trades);
        assert_eq!(view.models(components::STRATEGY_STATUS).len(), 1);
    }

    #[test]
    fn alert_rows_link_strategy_and_pick_message_by_access() {
        let raw = day(vec![strategy("[Live] id1", "US Equities", "Hold")], vec![]);
        let index = index();
        let mut user = basic_user();
        user.strategy_ids.insert("[Live] id1".into());

        let basic = ViewModelBuilder::new(&index, &[]).build(&raw, &user).unwrap();
        let row = &basic.component(components::STRATEGY_ALERT).unwrap().as_grid().unwrap().child[0];
        match &row[0] {
            Cell::Rich(link) => {
                assert_eq!(link.element, "a");
                assert_eq!(link.value, "US Equities");
                assert_eq!(link.attributes.get("href"), Some("id1"));
            }
            Cell::Text(_) => panic!("expected link cell"),
        }
        assert_eq!(row[1], Cell::text("Hold"));
        assert_eq!(row[2], Cell::text("US Equities: general"));

        user.access = AccessType::Detailed;
        let detailed = ViewModelBuilder::new(&index, &[]).build(&raw, &user).unwrap();
        let row = &detailed.component(components::STRATEGY_ALERT).unwrap().as_grid().unwrap().child[0];
        assert_eq!(row[2], Cell::text("US Equities: detailed"));
    }

    #[test]
    fn market_rows_are_filtered_and_lose_id_column() {
        let raw = day(
            vec![],
            vec![
                json!(["m1", "SPX", 4300.5, 4310, 4290, 4305, 17.2, "+0.4%"]),
                json!(["m2", "NDX", 15000, 15050, 14900, 14850, -150, "-1%"]),
            ],
        );
        let index = index();
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        let market = view.component(components::MARKET_STATUS).unwrap().as_grid().unwrap();
        assert_eq!(market.parent.len(), 1);
        assert_eq!(market.child.len(), 1);
        let row = &market.child[0];
        assert_eq!(row.len(), MARKET_COLUMNS - 1);
        assert_eq!(row[0], Cell::text("SPX"));
        assert_eq!(row[1], Cell::text("4300.5"));
        assert_eq!(row[6], Cell::text("+0.4%"));
        match &market.parent[0] {
            Cell::Rich(time) => {
                assert_eq!(time.element, "time");
                assert_eq!(time.attributes.get("datetime"), Some("2021-07-12"));
            }
            Cell::Text(_) => panic!("expected time cell"),
        }
    }

    #[test]
    fn strategy_status_parent_fields() {
        let raw = day(vec![strategy("id1", "US Equities", "Hold")], vec![]);
        let index = index();
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        let models = view.models(components::STRATEGY_STATUS);
        let grid = models[0].as_grid().unwrap();
        assert_eq!(grid.parent.len(), 4);
        assert_eq!(grid.parent[0], Cell::text("US Equities"));
        assert_eq!(grid.parent[1].value(), "1.5");
        match &grid.parent[1] {
            Cell::Rich(gain) => assert_eq!(gain.attributes.get("data-sign"), Some("+")),
            Cell::Text(_) => panic!("expected gain span"),
        }
        assert_eq!(grid.parent[2].value(), "41 days");
        assert_eq!(grid.parent[3].value(), "2021-06-01");
        assert!(grid.child.is_empty());
    }

    #[test]
    fn everything_filtered_still_well_formed() {
        let raw = day(
            vec![strategy("id9", "Other", "Enter")],
            vec![market("m9", "DAX")],
        );
        let index = index();
        let user = User::new(AccessType::Basic);
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &user).unwrap();

        let market = view.component(components::MARKET_STATUS).unwrap().as_grid().unwrap();
        assert_eq!(market.parent.len(), 1);
        assert!(market.child.is_empty());
        let alert = view.component(components::STRATEGY_ALERT).unwrap().as_grid().unwrap();
        assert_eq!(alert.parent.len(), 3);
        assert!(alert.child.is_empty());
        assert!(matches!(view[components::STRATEGY_STATUS], ViewEntry::Repeated(ref v) if v.is_empty()));
    }

    #[test]
    fn day_outside_index_is_lookup_error() {
        let raw = day(vec![], vec![]);
        let index = vec![DayId::new("1"), DayId::new("0")];
        let err = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap_err();
        assert_eq!(err, BuildError::DayNotFound { day: DayId::new("2") });
        assert_eq!(err.kind(), crate::error::ErrorKind::Lookup);
    }

    #[test]
    fn short_rows_are_shape_errors() {
        let index = index();
        let raw = day(vec![json!(["S", "id1", "name"])], vec![]);
        let err = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap_err();
        assert_eq!(err, BuildError::shape("strategy", 0, 7, 3));

        let raw = day(vec![], vec![json!(["m1"])]);
        let err = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap_err();
        assert_eq!(err, BuildError::shape("market", 0, 8, 1));
    }

    #[test]
    fn market_row_must_fill_every_column() {
        let index = index();
        let raw = day(vec![], vec![json!(["m1", "SPX", 4300.0, 4310.0])]);
        let err = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap_err();
        assert_eq!(err, BuildError::shape("market", 0, 8, 4));
        assert_eq!(err.kind(), crate::error::ErrorKind::Shape);

        // Width is checked before entitlement.
        let raw = day(vec![], vec![market("m1", "SPX"), json!(["m2", "NDX", 1, 2, 3, 4, 5, 6, 7])]);
        let err = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap_err();
        assert_eq!(err, BuildError::shape("market", 1, 8, 9));
    }

    #[test]
    fn unentitled_strategy_without_position_is_ignored() {
        let index = index();
        let raw = day(
            vec![
                strategy("id1", "US Equities", "Hold"),
                json!(["S2", "id2", "Speculative", "Enter", "g", "d", []]),
            ],
            vec![],
        );
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        assert_eq!(view.models(components::STRATEGY_STATUS).len(), 1);
        assert!(!view.new_trades);

        let user = basic_user().with_strategies(["id2"]);
        let err = ViewModelBuilder::new(&index, &[]).build(&raw, &user).unwrap_err();
        assert!(matches!(err, BuildError::Malformed { index: 1, .. }));
    }

    #[test]
    fn short_unentitled_strategy_is_still_shape_error() {
        let index = index();
        let raw = day(
            vec![strategy("id1", "US Equities", "Hold"), json!(["S2", "id2"])],
            vec![],
        );
        let err = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap_err();
        assert_eq!(err, BuildError::shape("strategy", 1, 7, 2));
    }

    #[test]
    fn metrics_are_filtered_by_strategy() {
        let raw = day(vec![], vec![]);
        let index = index();
        let metrics = vec![
            vec![json!("k"), json!("id1"), json!(0.12)],
            vec![json!("k"), json!("id2"), json!(0.40)],
        ];
        let view = ViewModelBuilder::new(&index, &metrics).build(&raw, &basic_user()).unwrap();
        assert_eq!(view.metrics, vec![metrics[0].clone()]);
    }

    #[test]
    fn build_does_not_touch_inputs() {
        let raw = day(vec![strategy("id1", "US", "Exit")], vec![market("m1", "SPX")]);
        let before = raw.clone();
        let index = index();
        let first = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        let second = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        assert_eq!(raw, before);
        assert_eq!(first, second);
    }

    #[test]
    fn view_model_round_trips_through_wire_json() {
        let raw = day(vec![strategy("id1", "US", "Exit")], vec![market("m1", "SPX")]);
        let index = index();
        let view = ViewModelBuilder::new(&index, &[]).build(&raw, &basic_user()).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["components"]["strategy-alert"]["parent"][0], "ACTION ALERT!");
        let back: ViewModel = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }
}
