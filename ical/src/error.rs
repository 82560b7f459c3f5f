// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Errors that abort a parse.

use crate::syntax::GrammarError;
use crate::tree_builder::StructureError;
use crate::value::ValueError;

/// Fatal error of a parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A line does not match the content line grammar.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The component structure is malformed.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// A typed value failed to parse in strict mode.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Reading the input failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}
