// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Logical line reader.
//!
//! Turns physical lines into logical content lines: folded continuation lines
//! (starting with a space or horizontal tab) are joined to their predecessor,
//! surrounding whitespace is trimmed and blank lines are skipped.

use std::io;

/// Iterator adapter producing logical content lines.
#[derive(Debug)]
pub struct LogicalLines<I> {
    lines: I,
    unfold: bool,
    pending: Option<String>,
    failed: Option<io::Error>,
}

impl<I> LogicalLines<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    /// Wrap an iterator of physical lines.
    pub fn new(lines: I, unfold: bool) -> Self {
        Self {
            lines,
            unfold,
            pending: None,
            failed: None,
        }
    }
}

impl<I> Iterator for LogicalLines<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failed.take() {
            return Some(Err(err));
        }

        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if self.unfold
                        && let Some(pending) = self.pending.as_mut()
                        && let Some(rest) = line.strip_prefix([' ', '\t'])
                    {
                        pending.push_str(rest);
                        continue;
                    }

                    if let Some(done) = self.pending.replace(line).and_then(finish) {
                        return Some(Ok(done));
                    }
                }
                Some(Err(err)) => match self.pending.take().and_then(finish) {
                    Some(done) => {
                        self.failed = Some(err);
                        return Some(Ok(done));
                    }
                    None => return Some(Err(err)),
                },
                None => return self.pending.take().and_then(finish).map(Ok),
            }
        }
    }
}

fn finish(line: String) -> Option<String> {
    let trimmed = line.trim();
    match trimmed.len() {
        0 => None,
        n if n == line.len() => Some(line),
        _ => Some(trimmed.to_owned()),
    }
}
