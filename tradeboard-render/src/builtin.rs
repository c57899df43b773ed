//! Built-in dashboard templates.
//!
//! Slot order in each template matches the cell order the view-model
//! builder produces for that component.

use crate::template::{Template, TemplateNode as N, TemplateRegistry, CHILD_ANCHOR, PARENT_ANCHOR};

pub const USER_UNAUTHORISED: &str = "user-unauthorised";
pub const USER_WELCOME: &str = "user-welcome";
pub const STRATEGY_STATUS_HEADER: &str = "strategy-status-header";

pub use tradeboard_core::components::{MARKET_STATUS, STRATEGY_ALERT, STRATEGY_STATUS};

/// Components registered by [`crate::RenderContext::dashboard`].
pub const COMPONENTS: [&str; 6] = [
    USER_UNAUTHORISED,
    USER_WELCOME,
    STRATEGY_ALERT,
    MARKET_STATUS,
    STRATEGY_STATUS_HEADER,
    STRATEGY_STATUS,
];

const MARKET_COLUMNS: [&str; 7] = ["Symbol", "Open", "High", "Low", "Close", "Change", "Change %"];

pub fn templates() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    for template in [
        user_unauthorised(),
        user_welcome(),
        strategy_alert(),
        strategy_alert_child(),
        market_status(),
        market_status_child(),
        strategy_status_header(),
        strategy_status(),
        strategy_status_child(),
    ] {
        registry.register(template);
    }
    registry
}

fn user_unauthorised() -> Template {
    Template::new(
        USER_UNAUTHORISED,
        vec![N::element("section").attr("class", "notice").children([
            N::element("h2").child(N::text("Sign in required")),
            N::element("p").child(N::text(
                "Your account is not registered for trading signals.",
            )),
        ])],
    )
}

fn user_welcome() -> Template {
    Template::new(
        USER_WELCOME,
        vec![N::element("section").attr("class", "notice").child(
            N::element("p").children([
                N::text("Welcome, "),
                N::slot().child(N::text("trader")),
                N::text("!"),
            ]),
        )],
    )
}

fn strategy_alert() -> Template {
    Template::new(
        STRATEGY_ALERT,
        vec![N::element("section").attr("class", "alert").children([
            N::element("h2").child(N::slot()),
            N::element("p").children([N::slot(), N::slot()]),
            N::element("table").child(N::element("tbody").attr(PARENT_ANCHOR, "")),
        ])],
    )
}

fn strategy_alert_child() -> Template {
    Template::new(
        &format!("{STRATEGY_ALERT}-child"),
        vec![N::element("tr").attr(CHILD_ANCHOR, "").children([
            N::element("th").child(N::slot()),
            N::element("td").attr("class", "action").child(N::slot()),
            N::element("td").child(N::slot()),
        ])],
    )
}

fn market_status() -> Template {
    let header = N::element("tr").children(
        MARKET_COLUMNS
            .iter()
            .map(|column| N::element("th").child(N::text(column))),
    );
    Template::new(
        MARKET_STATUS,
        vec![N::element("section").attr("class", "markets").children([
            N::element("h2").children([N::text("Markets at "), N::slot()]),
            N::element("table").children([
                N::element("thead").child(header),
                N::element("tbody").attr(PARENT_ANCHOR, ""),
            ]),
        ])],
    )
}

fn market_status_child() -> Template {
    Template::new(
        &format!("{MARKET_STATUS}-child"),
        vec![N::element("tr")
            .attr(CHILD_ANCHOR, "")
            .children(MARKET_COLUMNS.iter().map(|_| N::element("td").child(N::slot())))],
    )
}

fn strategy_status_header() -> Template {
    Template::new(
        STRATEGY_STATUS_HEADER,
        vec![N::element("h2").children([N::text("Strategy status, "), N::slot()])],
    )
}

fn strategy_status() -> Template {
    let field = |label: &str| {
        N::element("div").children([
            N::element("dt").child(N::text(label)),
            N::element("dd").child(N::slot()),
        ])
    };
    Template::new(
        STRATEGY_STATUS,
        vec![N::element("article").attr("class", "strategy").children([
            N::element("h3").child(N::slot()),
            N::element("dl").children([field("Gain"), field("Held"), field("Since")]),
            N::element("table").child(N::element("tbody").attr(PARENT_ANCHOR, "")),
        ])],
    )
}

fn strategy_status_child() -> Template {
    Template::new(
        &format!("{STRATEGY_STATUS}-child"),
        vec![N::element("tr").attr(CHILD_ANCHOR, "").children([
            N::element("td").child(N::slot()),
            N::element("td").child(N::slot()),
        ])],
    )
}
