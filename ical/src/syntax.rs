// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Content line syntax: lexing, the line grammar and the logical line reader.

mod lexer;
mod line;
mod reader;

pub use lexer::Token;
pub use line::{GrammarError, LineParameter, ParsedLine, find_parameter, parse_line};
pub use reader::LogicalLines;
