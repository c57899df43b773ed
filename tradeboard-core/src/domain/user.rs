//! Users, their entitlements, and per-component field labels.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Level of detail a user is licensed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessType {
    #[default]
    Basic,
    Detailed,
}

/// A registered user and the strategies/markets they may see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(rename = "strategyIds", default)]
    pub strategy_ids: BTreeSet<String>,
    #[serde(rename = "marketSymbols", default)]
    pub market_symbols: BTreeSet<String>,
    #[serde(rename = "type", default)]
    pub access: AccessType,
    /// Show the welcome notice on the next page render.
    #[serde(default)]
    pub welcome: bool,
    #[serde(default)]
    pub config: UserConfig,
}

impl User {
    pub fn new(access: AccessType) -> Self {
        Self {
            id: String::new(),
            firstname: String::new(),
            strategy_ids: BTreeSet::new(),
            market_symbols: BTreeSet::new(),
            access,
            welcome: false,
            config: UserConfig::default(),
        }
    }

    pub fn with_strategies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategy_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_markets<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.market_symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn is_detailed(&self) -> bool {
        self.access == AccessType::Detailed
    }

    /// Field labels configured for `component`, if any.
    pub fn labels(&self, component: &str) -> Option<&FieldLabels> {
        self.config.labels.get(component)
    }
}

/// Per-user configuration: data loading flags plus field labels keyed by
/// component name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(flatten)]
    pub labels: BTreeMap<String, FieldLabels>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Fetch every day in the index, not just the latest.
    #[serde(default)]
    pub loadhistory: Option<bool>,
}

/// Slot names for a component's values.
///
/// Empty strings count as "no label"; the renderer then falls back to the
/// positional name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldLabels {
    Flat(Vec<String>),
    Grid {
        #[serde(default)]
        parent: Vec<String>,
        #[serde(default)]
        child: Vec<Vec<String>>,
    },
}

impl FieldLabels {
    pub fn flat(&self, position: usize) -> Option<&str> {
        match self {
            FieldLabels::Flat(labels) => non_empty(labels.get(position)),
            FieldLabels::Grid { .. } => None,
        }
    }

    pub fn parent(&self, position: usize) -> Option<&str> {
        match self {
            FieldLabels::Grid { parent, .. } => non_empty(parent.get(position)),
            FieldLabels::Flat(_) => None,
        }
    }

    pub fn child(&self, row: usize, column: usize) -> Option<&str> {
        match self {
            FieldLabels::Grid { child, .. } => {
                non_empty(child.get(row).and_then(|labels| labels.get(column)))
            }
            FieldLabels::Flat(_) => None,
        }
    }
}

fn non_empty(label: Option<&String>) -> Option<&str> {
    label.map(String::as_str).filter(|l| !l.is_empty())
}

/// All registered users, as loaded from the user registry file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRegistry {
    users: Vec<User>,
}

impl UserRegistry {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Resolve the user for a request. `None` means unauthorised: either no
    /// id was supplied or it is not registered.
    pub fn current_user(&self, id: Option<&str>) -> Option<&User> {
        let id = id.filter(|id| !id.is_empty())?;
        self.users.iter().find(|user| user.id == id)
    }
}
