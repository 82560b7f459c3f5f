// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Pluggable lookup tables used while building the component tree.
//!
//! All tables are filled with the built-in entries on construction and can
//! be extended or overridden per [`Context`](crate::Context).

use std::collections::HashMap;

use crate::component::{ComponentKind, StructuralNode};
use crate::keyword::{
    KW_COMPLETED, KW_CREATED, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_DUE, KW_EXDATE, KW_EXRULE,
    KW_LAST_MODIFIED, KW_PERCENT_COMPLETE, KW_PRIORITY, KW_RDATE, KW_RECURRENCE_ID, KW_REPEAT,
    KW_RRULE, KW_SEQUENCE, KW_TZOFFSETFROM, KW_TZOFFSETTO, KW_VALUE,
};
use crate::syntax::{LineParameter, find_parameter};
use crate::value::{
    ValueParser, ValueType, parse_date, parse_date_time, parse_integer, parse_recur, parse_text,
    parse_utc_offset,
};

/// The service registry of a context.
#[derive(Debug, Clone, Default)]
pub struct Services {
    type_mapper: TypeMapper,
    parsers: ValueParserRegistry,
    components: ComponentFactory,
}

impl Services {
    /// Property name to value type mapping.
    #[must_use]
    pub const fn type_mapper(&self) -> &TypeMapper {
        &self.type_mapper
    }

    /// Property name to value type mapping, mutably.
    pub fn type_mapper_mut(&mut self) -> &mut TypeMapper {
        &mut self.type_mapper
    }

    /// Value type to parser mapping.
    #[must_use]
    pub const fn parsers(&self) -> &ValueParserRegistry {
        &self.parsers
    }

    /// Value type to parser mapping, mutably.
    pub fn parsers_mut(&mut self) -> &mut ValueParserRegistry {
        &mut self.parsers
    }

    /// Component name to node factory.
    #[must_use]
    pub const fn components(&self) -> &ComponentFactory {
        &self.components
    }

    /// Component name to node factory, mutably.
    pub fn components_mut(&mut self) -> &mut ComponentFactory {
        &mut self.components
    }
}

/// Maps property names to the value type their values are parsed as.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    table: HashMap<String, ValueType>,
}

impl Default for TypeMapper {
    fn default() -> Self {
        #[rustfmt::skip]
        let builtin = [
            (KW_DTSTART,          ValueType::DateTime),
            (KW_DTEND,            ValueType::DateTime),
            (KW_DUE,              ValueType::DateTime),
            (KW_RECURRENCE_ID,    ValueType::DateTime),
            (KW_EXDATE,           ValueType::DateTime),
            (KW_RDATE,            ValueType::DateTime),
            (KW_DTSTAMP,          ValueType::DateTime),
            (KW_CREATED,          ValueType::DateTime),
            (KW_LAST_MODIFIED,    ValueType::DateTime),
            (KW_COMPLETED,        ValueType::DateTime),
            (KW_TZOFFSETFROM,     ValueType::UtcOffset),
            (KW_TZOFFSETTO,       ValueType::UtcOffset),
            (KW_RRULE,            ValueType::Recur),
            (KW_EXRULE,           ValueType::Recur),
            (KW_SEQUENCE,         ValueType::Integer),
            (KW_PRIORITY,         ValueType::Integer),
            (KW_PERCENT_COMPLETE, ValueType::Integer),
            (KW_REPEAT,           ValueType::Integer),
        ];
        Self {
            table: builtin
                .into_iter()
                .map(|(name, ty)| (name.to_owned(), ty))
                .collect(),
        }
    }
}

impl TypeMapper {
    /// The value type of a property.
    ///
    /// An explicit `VALUE` parameter wins. A `VALUE` naming a type without a
    /// built-in parser maps to [`ValueType::Text`], as does any property
    /// missing from the table.
    #[must_use]
    pub fn value_type(&self, property: &str, parameters: &[LineParameter]) -> ValueType {
        if let Some(explicit) = find_parameter(parameters, KW_VALUE).and_then(LineParameter::first)
        {
            return explicit.parse().unwrap_or(ValueType::Text);
        }

        self.table
            .get(&property.to_ascii_uppercase())
            .copied()
            .unwrap_or(ValueType::Text)
    }

    /// Map a property name to a value type, returning the previous mapping.
    pub fn insert(&mut self, property: &str, value_type: ValueType) -> Option<ValueType> {
        self.table.insert(property.to_ascii_uppercase(), value_type)
    }
}

/// Maps value types to the parsers that turn raw text into typed values.
#[derive(Debug, Clone)]
pub struct ValueParserRegistry {
    parsers: HashMap<ValueType, ValueParser>,
}

impl Default for ValueParserRegistry {
    fn default() -> Self {
        let builtin: [(ValueType, ValueParser); 6] = [
            (ValueType::Text, parse_text),
            (ValueType::Integer, parse_integer),
            (ValueType::Date, parse_date),
            (ValueType::DateTime, parse_date_time),
            (ValueType::UtcOffset, parse_utc_offset),
            (ValueType::Recur, parse_recur),
        ];
        Self {
            parsers: builtin.into_iter().collect(),
        }
    }
}

impl ValueParserRegistry {
    /// The parser for a value type, falling back to the text parser.
    #[must_use]
    pub fn get(&self, value_type: ValueType) -> ValueParser {
        self.parsers
            .get(&value_type)
            .copied()
            .unwrap_or(parse_text)
    }

    /// Register a parser, returning the one it replaces.
    pub fn register(&mut self, value_type: ValueType, parser: ValueParser) -> Option<ValueParser> {
        self.parsers.insert(value_type, parser)
    }
}

/// Creates empty nodes for component names.
#[derive(Debug, Clone, Default)]
pub struct ComponentFactory {
    overrides: HashMap<String, ComponentKind>,
}

impl ComponentFactory {
    /// The kind of a component name, case-insensitively.
    #[must_use]
    pub fn kind(&self, name: &str) -> ComponentKind {
        self.overrides
            .get(&name.to_ascii_uppercase())
            .copied()
            .or_else(|| name.parse().ok())
            .unwrap_or(ComponentKind::Other)
    }

    /// A new, empty node for a component name.
    #[must_use]
    pub fn build(&self, name: &str) -> StructuralNode {
        StructuralNode::new(self.kind(name), name)
    }

    /// Map a component name to a kind, overriding the built-in mapping.
    pub fn register(&mut self, name: &str, kind: ComponentKind) -> Option<ComponentKind> {
        self.overrides.insert(name.to_ascii_uppercase(), kind)
    }
}
