// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Line reordering that moves `VTIMEZONE` blocks ahead of other content.
//!
//! `BEGIN:VCALENDAR` and every line of a `VTIMEZONE` block pass through at
//! once. All other lines are held back until `END:VCALENDAR`, which releases
//! them in their original order. Zone definitions are thus complete before
//! any value that refers to them is parsed.

use std::collections::VecDeque;

use crate::keyword::{KW_VCALENDAR, KW_VTIMEZONE};
use crate::syntax::ParsedLine;
use crate::tree_builder::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    BeginCalendar,
    EndCalendar,
    BeginTimezone,
    EndTimezone,
    Other,
}

impl LineKind {
    fn of(line: &ParsedLine) -> Self {
        let calendar = line.value.eq_ignore_ascii_case(KW_VCALENDAR);
        let timezone = line.value.eq_ignore_ascii_case(KW_VTIMEZONE);
        match (line.is_begin(), line.is_end()) {
            (true, _) if calendar => Self::BeginCalendar,
            (true, _) if timezone => Self::BeginTimezone,
            (_, true) if calendar => Self::EndCalendar,
            (_, true) if timezone => Self::EndTimezone,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    Outside,
    InTimezone,
}

/// Reordering state machine.
#[derive(Debug, Default)]
pub(super) struct Reorder {
    state: State,
    pending: Vec<ParsedLine>,
}

impl Reorder {
    /// Feed one line, appending every line it releases to `ready`.
    pub(super) fn feed(
        &mut self,
        line: ParsedLine,
        ready: &mut VecDeque<ParsedLine>,
    ) -> Result<(), StructureError> {
        use LineKind::{BeginCalendar, BeginTimezone, EndCalendar, EndTimezone};
        use State::{InTimezone, Outside};

        match (self.state, LineKind::of(&line)) {
            (Outside, BeginCalendar) => ready.push_back(line),
            (Outside, EndCalendar) => {
                ready.extend(self.pending.drain(..));
                ready.push_back(line);
            }
            (Outside, BeginTimezone) => {
                self.state = InTimezone;
                ready.push_back(line);
            }
            (Outside, _) => self.pending.push(line),
            (InTimezone, BeginCalendar | EndCalendar) => {
                return Err(StructureError::CalendarInsideTimezone {
                    keyword: line.name.to_ascii_uppercase(),
                });
            }
            (InTimezone, BeginTimezone) => return Err(StructureError::NestedTimezone),
            (InTimezone, EndTimezone) => {
                self.state = Outside;
                ready.push_back(line);
            }
            (InTimezone, _) => ready.push_back(line),
        }
        Ok(())
    }

    /// Drop the lines still held back, returning how many there were.
    pub(super) fn finish(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}
