// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, BufRead};

use crate::component::StructuralNode;
use crate::context::Context;
use crate::error::ParseError;
use crate::syntax::{LogicalLines, ParsedLine, parse_line};
use crate::tree_builder::TreeBuilder;

/// Parse iCalendar source lazily, one top-level component at a time.
///
/// `VTIMEZONE` components are derived into engines as soon as they are
/// complete, so later `TZID` references resolve through them. The engines
/// stay cached in the context after the parse.
///
/// ## Examples
///
/// ```
/// # use tzcal_ical::{Context, parse_str};
/// let src = "\
/// BEGIN:VCALENDAR\r\n\
/// BEGIN:VEVENT\r\n\
/// DTSTART;TZID=Fixed/Plus3:20231029T030000\r\n\
/// END:VEVENT\r\n\
/// BEGIN:VTIMEZONE\r\n\
/// TZID:Fixed/Plus3\r\n\
/// BEGIN:STANDARD\r\n\
/// DTSTART:19700101T000000\r\n\
/// TZOFFSETFROM:+0300\r\n\
/// TZOFFSETTO:+0300\r\n\
/// END:STANDARD\r\n\
/// END:VTIMEZONE\r\n\
/// END:VCALENDAR\r\n\
/// ";
/// let mut ctx = Context::new();
/// let calendars = parse_str(&mut ctx, src).collect::<Result<Vec<_>, _>>().unwrap();
/// assert_eq!(calendars.len(), 1);
/// assert!(ctx.timezone("Fixed/Plus3").is_some());
/// ```
pub fn parse_str<'ctx>(
    ctx: &'ctx mut Context,
    src: &str,
) -> TreeBuilder<'ctx, impl Iterator<Item = Result<ParsedLine, ParseError>>> {
    let unfold = ctx.config().unfold_lines;
    let physical = src.lines().map(|line| Ok::<_, io::Error>(line.to_owned()));
    TreeBuilder::new(ctx, LogicalLines::new(physical, unfold).map(grammar))
}

/// Parse iCalendar input from a reader lazily.
///
/// Read failures surface as [`ParseError::Io`] and end the parse.
pub fn parse_reader<'ctx, R: BufRead>(
    ctx: &'ctx mut Context,
    reader: R,
) -> TreeBuilder<'ctx, impl Iterator<Item = Result<ParsedLine, ParseError>>> {
    let unfold = ctx.config().unfold_lines;
    TreeBuilder::new(ctx, LogicalLines::new(reader.lines(), unfold).map(grammar))
}

/// Parse all components of iCalendar source with a fresh default context.
///
/// ## Errors
///
/// Returns the first grammar or structure error.
pub fn parse_components(src: &str) -> Result<Vec<StructuralNode>, ParseError> {
    let mut ctx = Context::new();
    parse_str(&mut ctx, src).collect()
}

fn grammar(line: io::Result<String>) -> Result<ParsedLine, ParseError> {
    Ok(parse_line(&line?)?)
}
