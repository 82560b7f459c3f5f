// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parser configuration.

/// Options controlling a single parse.
///
/// Every field is optional when deserializing, missing fields take their
/// default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct ParserConfig {
    /// Join folded continuation lines before the grammar runs.
    #[serde(default = "default_true")]
    pub unfold_lines: bool,

    /// Derive a timezone engine for every completed VTIMEZONE and cache it in
    /// the context.
    #[serde(default = "default_true")]
    pub derive_timezones: bool,

    /// Abort on typed values that fail to parse instead of falling back to
    /// text.
    #[serde(default)]
    pub strict_values: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            unfold_lines: true,
            derive_timezones: true,
            strict_values: false,
        }
    }
}

const fn default_true() -> bool {
    true
}
