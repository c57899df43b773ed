//! End-to-end view-model scenarios and properties.

use proptest::prelude::*;
use serde_json::{json, Value};
use tradeboard_core::{
    components, AccessType, Cell, DayId, RawDay, User, ViewModelBuilder, TRADE_ACTIONS,
};

fn position() -> Value {
    json!(["p", "x", "SPY", 10, 420.5, "2021-06-01", "41 days", 430.1, 0.02, 1.5])
}

fn strategy_row(id: &str, action: &str) -> Value {
    json!(["S1", id, "US Equities", action, "general", "detailed", [position()]])
}

fn raw_day(strategies: Vec<Value>) -> RawDay {
    RawDay::from_value(
        DayId::new("2"),
        &json!(["2021-07-12", strategies, [], [["m1", "SPX", 4300.0, 4310.0, 4290.0, 4305.0, 5.0, 0.12]], {}]),
    )
    .unwrap()
}

#[test]
fn hold_day_headline_for_basic_user() {
    let index = vec![DayId::new("2"), DayId::new("1"), DayId::new("0")];
    let day = raw_day(vec![strategy_row("id1", "Hold")]);
    let user = User::new(AccessType::Basic)
        .with_strategies(["id1"])
        .with_markets(["SPX"]);

    let view = ViewModelBuilder::new(&index, &[]).build(&day, &user).unwrap();

    let alert = view.component(components::STRATEGY_ALERT).unwrap();
    assert_eq!(alert.as_grid().unwrap().parent[0], Cell::text("No new trades today"));

    let market = view.component(components::MARKET_STATUS).unwrap().as_grid().unwrap();
    assert_eq!(market.child.len(), 1);
    assert_eq!(market.child[0][0], Cell::text("SPX"));
}

fn action() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Hold".to_string()),
        Just("Enter".to_string()),
        Just("Exit".to_string()),
        Just("Rollover".to_string()),
        Just("Switch".to_string()),
        Just("Wait".to_string()),
    ]
}

proptest! {
    /// New trades iff some entitled strategy has a trade action.
    #[test]
    fn new_trades_iff_entitled_trade_action(
        rows in prop::collection::vec((action(), any::<bool>()), 0..8)
    ) {
        let strategies: Vec<Value> = rows
            .iter()
            .enumerate()
            .map(|(i, (act, _))| strategy_row(&format!("id{i}"), act))
            .collect();
        let entitled: Vec<String> = rows
            .iter()
            .enumerate()
            .filter(|(_, (_, keep))| *keep)
            .map(|(i, _)| format!("id{i}"))
            .collect();
        let expected = rows
            .iter()
            .any(|(act, keep)| *keep && TRADE_ACTIONS.contains(&act.as_str()));

        let index = vec![DayId::new("2")];
        let user = User::new(AccessType::Detailed).with_strategies(entitled.clone());
        let view = ViewModelBuilder::new(&index, &[]).build(&raw_day(strategies), &user).unwrap();

        prop_assert_eq!(view.new_trades, expected);
        prop_assert_eq!(view.models(components::STRATEGY_STATUS).len(), entitled.len());
        let alert = view.component(components::STRATEGY_ALERT).unwrap().as_grid().unwrap();
        prop_assert_eq!(alert.child.len(), entitled.len());
        prop_assert!(alert.child.iter().all(|row| row.len() == 3));
    }
}
