// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse iCalendar text into components with timezone-correct date-times.
//!
//! Parsing runs line by line: the content line grammar, a tree builder that
//! moves `VTIMEZONE` blocks ahead of the content referring to them, and
//! typed value parsers. Each completed `VTIMEZONE` is derived into a
//! [`TimezoneEngine`] when its shape is supported, and `DATE-TIME` values
//! with a matching `TZID` resolve to UTC through that engine.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod component;
pub mod config;
pub mod context;
pub mod datetime;
pub mod error;
pub mod keyword;
mod parser;
pub mod services;
pub mod syntax;
pub mod tree_builder;
pub mod tz;
pub mod value;

pub use crate::component::{ComponentKind, Property, StructuralNode};
pub use crate::config::ParserConfig;
pub use crate::context::{Association, Context, Scope};
pub use crate::datetime::{DateTimeError, DateTimeValue, Origin};
pub use crate::error::ParseError;
pub use crate::parser::{parse_components, parse_reader, parse_str};
pub use crate::services::{ComponentFactory, Services, TypeMapper, ValueParserRegistry};
pub use crate::syntax::{GrammarError, LineParameter, ParsedLine, parse_line};
pub use crate::tree_builder::{StructureError, TreeBuilder};
pub use crate::tz::{
    AnnualRule, EngineKind, InvalidLocalTime, Rejection, TimezoneEngine, TransitionRule, derive,
};
pub use crate::value::{
    PropertyValue, RawValue, RecurrenceFrequency, RecurrenceRule, ValueDateTime, ValueError,
    ValueParser, ValueType, WeekDayNum,
};
