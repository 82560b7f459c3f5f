// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Per-parse context.
//!
//! A [`Context`] is created by the caller for each parse and owns all mutable
//! parse state: the association stack used to bind values to the structure
//! they were parsed in, the service registry and the cache of derived
//! timezone engines. It is not meant to be shared between concurrent parses.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::config::ParserConfig;
use crate::services::Services;
use crate::tz::TimezoneEngine;

/// The structural location a value was parsed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Association {
    /// Name of the enclosing component, e.g. `VEVENT`
    pub component: String,

    /// Name of the property, e.g. `DTSTART`
    pub property: String,
}

impl Association {
    /// Create a new association.
    pub fn new(component: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            property: property.into(),
        }
    }
}

impl Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.property)
    }
}

/// State scoped to a single parse.
#[derive(Debug, Default)]
pub struct Context {
    stack: Vec<Association>,
    services: Services,
    timezones: HashMap<String, Arc<TimezoneEngine>>,
    config: ParserConfig,
}

impl Context {
    /// Create a context with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with the given configuration.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Parser configuration of this context.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Push an association onto the stack.
    pub fn push(&mut self, association: Association) {
        self.stack.push(association);
    }

    /// Pop the innermost association.
    pub fn pop(&mut self) -> Option<Association> {
        self.stack.pop()
    }

    /// The innermost association, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&Association> {
        self.stack.last()
    }

    /// Push an association for the lifetime of the returned guard.
    ///
    /// The guard dereferences to the context and pops the association when
    /// dropped, on every exit path.
    pub fn scope(&mut self, association: Association) -> Scope<'_> {
        self.push(association);
        Scope { ctx: self }
    }

    /// The service registry.
    #[must_use]
    pub const fn services(&self) -> &Services {
        &self.services
    }

    /// The service registry, mutably.
    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    /// Register a timezone engine under its identifier.
    ///
    /// An engine already registered under the same identifier is replaced
    /// and returned.
    pub fn add_timezone(
        &mut self,
        engine: impl Into<Arc<TimezoneEngine>>,
    ) -> Option<Arc<TimezoneEngine>> {
        let engine = engine.into();
        let previous = self.timezones.insert(engine.id().to_owned(), engine);
        if let Some(previous) = &previous {
            tracing::warn!(
                tzid = previous.id(),
                "duplicate TZID, replacing cached timezone engine"
            );
        }
        previous
    }

    /// Look up a timezone engine by its exact identifier.
    #[must_use]
    pub fn timezone(&self, tzid: &str) -> Option<Arc<TimezoneEngine>> {
        self.timezones.get(tzid).cloned()
    }

    /// Remove every cached timezone engine.
    pub fn clear_timezones(&mut self) {
        self.timezones.clear();
    }

    /// Identifiers of every cached timezone engine, in no particular order.
    pub fn timezone_ids(&self) -> impl Iterator<Item = &str> {
        self.timezones.keys().map(String::as_str)
    }
}

/// Guard returned by [`Context::scope`].
#[derive(Debug)]
pub struct Scope<'ctx> {
    ctx: &'ctx mut Context,
}

impl Deref for Scope<'_> {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.ctx.pop();
    }
}
