// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tree builder for constructing the component hierarchy from content lines.
//!
//! # Architecture
//!
//! ```text
//! Content Lines → Reorder → Tree Builder → Components
//! ```
//!
//! # Algorithm
//!
//! The tree builder uses a stack-based algorithm:
//! 1. On BEGIN:X, push a new component onto the stack
//! 2. On property, parse its value and add it to the top of the stack
//! 3. On END:X, pop from the stack and add to the parent component, or
//!    emit it if the stack is now empty
//!
//! Components are emitted lazily, one top-level component per call to
//! [`Iterator::next`]. Completed `VTIMEZONE` components are turned into
//! engines and cached in the [`Context`] before the lines after them are
//! processed.

mod reorder;

use std::collections::VecDeque;

use crate::component::{ComponentKind, Property, StructuralNode};
use crate::context::{Association, Context};
use crate::error::ParseError;
use crate::syntax::ParsedLine;
use crate::tree_builder::reorder::Reorder;
use crate::tz;
use crate::value::{PropertyValue, RawValue, parse_text};

/// Malformed component structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// A property or END line outside any component
    #[error("expected BEGIN, found {found}")]
    ExpectedBegin {
        /// Name of the offending line
        found: String,
    },

    /// END does not match the innermost BEGIN
    #[error("mismatched nesting: expected END:{expected}, found END:{found}")]
    MismatchedNesting {
        /// Name of the innermost open component
        expected: String,
        /// Name on the END line
        found: String,
    },

    /// Input ended with an open component
    #[error("unclosed component {name}")]
    Unclosed {
        /// Name of the innermost open component
        name: String,
    },

    /// BEGIN or END of a VCALENDAR inside a VTIMEZONE block
    #[error("{keyword}:VCALENDAR was encountered while parsing VTIMEZONE")]
    CalendarInsideTimezone {
        /// `BEGIN` or `END`
        keyword: String,
    },

    /// A VTIMEZONE block opened inside another one
    #[error("BEGIN:VTIMEZONE appeared a second time before END:VTIMEZONE")]
    NestedTimezone,
}

/// Lazy iterator over the top-level components of a parse.
///
/// Stops after the first error.
#[derive(Debug)]
pub struct TreeBuilder<'ctx, I> {
    ctx: &'ctx mut Context,
    lines: I,
    reorder: Reorder,
    ready: VecDeque<ParsedLine>,
    stack: Vec<StructuralNode>,
    done: bool,
}

impl<'ctx, I> TreeBuilder<'ctx, I>
where
    I: Iterator<Item = Result<ParsedLine, ParseError>>,
{
    /// Build components from parsed lines, using the given context.
    pub fn new(ctx: &'ctx mut Context, lines: I) -> Self {
        Self {
            ctx,
            lines,
            reorder: Reorder::default(),
            ready: VecDeque::new(),
            stack: Vec::new(),
            done: false,
        }
    }

    /// The context of this parse.
    #[must_use]
    pub fn context(&self) -> &Context {
        self.ctx
    }

    fn advance(&mut self) -> Result<Option<StructuralNode>, ParseError> {
        loop {
            while let Some(line) = self.ready.pop_front() {
                if let Some(node) = self.apply(line)? {
                    return Ok(Some(node));
                }
            }

            match self.lines.next() {
                Some(line) => self.reorder.feed(line?, &mut self.ready)?,
                None => return self.finish().map(|()| None),
            }
        }
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        let discarded = self.reorder.finish();
        if discarded > 0 {
            tracing::warn!(lines = discarded, "discarding lines outside VCALENDAR");
        }

        match self.stack.last() {
            Some(open) => Err(StructureError::Unclosed {
                name: open.name.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }

    fn apply(&mut self, line: ParsedLine) -> Result<Option<StructuralNode>, ParseError> {
        if line.is_begin() {
            let node = self.ctx.services().components().build(&line.value);
            self.stack.push(node);
            return Ok(None);
        }

        if self.stack.is_empty() {
            return Err(StructureError::ExpectedBegin { found: line.name }.into());
        }

        if line.is_end() {
            return self.close(&line.value);
        }

        let property = self.property(line)?;
        if let Some(current) = self.stack.last_mut() {
            current.properties.push(property);
        }
        Ok(None)
    }

    fn close(&mut self, name: &str) -> Result<Option<StructuralNode>, ParseError> {
        let Some(node) = self.stack.pop() else {
            return Err(StructureError::ExpectedBegin {
                found: name.to_owned(),
            }
            .into());
        };
        if !node.name.eq_ignore_ascii_case(name) {
            return Err(StructureError::MismatchedNesting {
                expected: node.name,
                found: name.to_owned(),
            }
            .into());
        }

        if node.kind == ComponentKind::Timezone && self.ctx.config().derive_timezones {
            // Rejections are logged by the deriver
            if let Ok(engine) = tz::derive(&node) {
                tracing::debug!(tzid = engine.id(), "registered timezone engine");
                self.ctx.add_timezone(engine);
            }
        }

        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(node);
                Ok(None)
            }
            None => {
                tracing::debug!(component = %node.name, "emitting component");
                Ok(Some(node))
            }
        }
    }

    fn property(&mut self, line: ParsedLine) -> Result<Property, ParseError> {
        let name = line.name.to_ascii_uppercase();
        let component = self
            .stack
            .last()
            .map(|node| node.name.clone())
            .unwrap_or_default();

        let values = {
            let scope = self.ctx.scope(Association::new(component, name.clone()));
            let raw = RawValue {
                property: &name,
                parameters: &line.parameters,
                text: &line.value,
            };
            let value_type = scope
                .services()
                .type_mapper()
                .value_type(&name, &line.parameters);
            let parser = scope.services().parsers().get(value_type);

            match parser(&raw, &scope) {
                Ok(values) => values,
                Err(err) if scope.config().strict_values => return Err(err.into()),
                Err(err) => {
                    tracing::warn!(property = %name, error = %err, "falling back to text value");
                    vec![text_fallback(&raw, &scope)]
                }
            }
        };

        Ok(Property {
            name,
            parameters: line.parameters,
            values,
        })
    }
}

fn text_fallback(raw: &RawValue<'_>, ctx: &Context) -> PropertyValue {
    parse_text(raw, ctx)
        .ok()
        .and_then(|values| values.into_iter().next())
        .unwrap_or_else(|| PropertyValue::Text(raw.text.to_owned()))
}

impl<I> Iterator for TreeBuilder<'_, I>
where
    I: Iterator<Item = Result<ParsedLine, ParseError>>,
{
    type Item = Result<StructuralNode, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.advance();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result.transpose()
    }
}
