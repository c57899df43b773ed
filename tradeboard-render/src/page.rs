//! Page assembly: which components go where, for which user.

use chrono::NaiveDate;
use tradeboard_core::{Cell, ComponentModel, DayId, DayStore, User, ViewModel};

use crate::builtin::{
    MARKET_STATUS, STRATEGY_ALERT, STRATEGY_STATUS, STRATEGY_STATUS_HEADER, USER_UNAUTHORISED,
    USER_WELCOME,
};
use crate::context::RenderContext;
use crate::dom::{Document, NodeId};
use crate::error::PageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// No registered user; only the sign-in notice was rendered.
    Unauthorised,
    /// The user is known but no trading data has arrived.
    Pending,
    Rendered { day: DayId, instances: usize },
}

/// A `<body>` with an `<aside>` for user notices and a `<main>` for the
/// trading components.
#[derive(Debug)]
pub struct Page {
    pub document: Document,
    pub aside: NodeId,
    pub main: NodeId,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        let mut document = Document::new();
        let body = document.body();
        let aside = document.create_element("aside");
        let main = document.create_element("main");
        document.append_child(body, aside);
        document.append_child(body, main);
        Self {
            document,
            aside,
            main,
        }
    }

    /// Render the latest day of `store` for `user`.
    pub fn assemble(
        &mut self,
        ctx: &RenderContext,
        user: Option<&User>,
        store: Option<&DayStore>,
    ) -> Result<PageOutcome, PageError> {
        let today = store.and_then(DayStore::today).cloned();
        self.assemble_day(ctx, user, store, today.as_ref())
    }

    pub fn assemble_day(
        &mut self,
        ctx: &RenderContext,
        user: Option<&User>,
        store: Option<&DayStore>,
        day: Option<&DayId>,
    ) -> Result<PageOutcome, PageError> {
        let Some(user) = user else {
            let empty = ComponentModel::flat(Vec::<Cell>::new());
            ctx.project(&mut self.document, USER_UNAUTHORISED, self.aside, &empty, None)?;
            log::info!("no registered user, rendered sign-in notice");
            return Ok(PageOutcome::Unauthorised);
        };

        if user.welcome {
            let model = ComponentModel::flat([user.firstname.as_str()]);
            ctx.project(
                &mut self.document,
                USER_WELCOME,
                self.aside,
                &model,
                user.labels(USER_WELCOME),
            )?;
        }

        let (Some(store), Some(day)) = (store, day) else {
            log::info!("no trading data for user '{}' yet", user.id);
            return Ok(PageOutcome::Pending);
        };

        let view = store.view(day, user)?;
        self.render_view(ctx, user, &view)
    }

    /// Project an already-built view model into `<main>`.
    pub fn render_view(
        &mut self,
        ctx: &RenderContext,
        user: &User,
        view: &ViewModel,
    ) -> Result<PageOutcome, PageError> {
        let mut instances = 0;

        for component in [STRATEGY_ALERT, MARKET_STATUS] {
            if let Some(model) = view.component(component) {
                ctx.project(&mut self.document, component, self.main, model, user.labels(component))?;
                instances += 1;
            }
        }

        let header = ComponentModel::flat([heading_date(&view.date)]);
        ctx.project(
            &mut self.document,
            STRATEGY_STATUS_HEADER,
            self.main,
            &header,
            user.labels(STRATEGY_STATUS_HEADER),
        )?;
        instances += 1;

        for model in view.models(STRATEGY_STATUS) {
            ctx.project(
                &mut self.document,
                STRATEGY_STATUS,
                self.main,
                model,
                user.labels(STRATEGY_STATUS),
            )?;
            instances += 1;
        }

        log::info!("rendered day {} with {instances} component instances", view.day);
        Ok(PageOutcome::Rendered {
            day: view.day.clone(),
            instances,
        })
    }

    pub fn to_html(&self) -> String {
        self.document.to_html(self.document.body())
    }

    pub fn fingerprint(&self) -> String {
        self.document.fingerprint(self.document.body())
    }
}

/// `2021-07-12` as `Monday, 12 July 2021`; other text is returned unchanged.
pub fn heading_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%A, %-d %B %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
