//! Component definitions.
//!
//! Registering a component resolves its template once and fixes the name of
//! the event its instances emit on click. Every instance carries a
//! [`ComponentBinding`] built from its definition; dispatch reads it to
//! re-emit clicks (see [`crate::event`]).

use std::collections::BTreeMap;

use crate::dom::ComponentBinding;
use crate::error::RenderError;
use crate::template::{Template, TemplateRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    pub name: String,
    pub event_name: String,
    pub template: Template,
}

impl ComponentDefinition {
    pub fn binding(&self) -> ComponentBinding {
        ComponentBinding {
            component: self.name.clone(),
            event_name: self.event_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    definitions: BTreeMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` from the template of the same name. The event name
    /// defaults to the component name.
    pub fn define(
        &mut self,
        templates: &TemplateRegistry,
        name: &str,
        event_name: Option<&str>,
    ) -> Result<&ComponentDefinition, RenderError> {
        let template = templates
            .resolve(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?
            .clone();
        let definition = ComponentDefinition {
            name: name.to_string(),
            event_name: event_name.unwrap_or(name).to_string(),
            template,
        };
        log::debug!(
            "registered component '{}' emitting '{}'",
            definition.name,
            definition.event_name
        );
        self.definitions.insert(name.to_string(), definition);
        Ok(&self.definitions[name])
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
