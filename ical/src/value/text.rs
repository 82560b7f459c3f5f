// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parsers for text and integer values as defined in RFC 5545 Section 3.3.

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::label::LabelError;
use chumsky::prelude::*;

use crate::value::ValueExpected;

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// text       = *(TSAFE-CHAR / ":" / DQUOTE / ESCAPED-CHAR)
/// ; Folded according to description above
///
/// ESCAPED-CHAR = ("\\" / "\;" / "\," / "\N" / "\n")
/// ; \\ encodes \, \N or \n encodes newline
/// ; \; encodes ;, \, encodes ,
/// ```
///
/// Unescaped commas and semicolons are kept as written, the whole value is a
/// single text.
pub(super) fn value_text<'src, I, E>() -> impl Parser<'src, I, String, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let escape = just('\\').ignore_then(select! {
        ';' => ';',
        ',' => ',',
        'N' | 'n' => '\n',
        '\\' => '\\',
    });

    choice((select! { c if c != '\\' => c }, escape))
        .repeated()
        .collect()
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// integer    = (["+"] / "-") 1*DIGIT
/// ```
fn value_integer<'src, I, E>() -> impl Parser<'src, I, i32, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    select! { c @ ('+' | '-') => c }
        .or_not()
        .then(
            select! { c @ '0'..='9' => c }
                .repeated()
                .at_least(1)
                .collect::<String>(),
        )
        .try_map_with(|(sign, digits), e| {
            let mut int_str = String::with_capacity(digits.len() + 1);
            if let Some(s) = sign {
                int_str.push(s);
            }
            int_str.push_str(&digits);

            lexical::parse::<i32, _>(&int_str)
                .map_err(|_| E::Error::expected_found([ValueExpected::I32], None, e.span()))
        })
}

/// Integer multiple values parser.
///
/// If the property permits, multiple "integer" values are specified by a
/// COMMA-separated list of values.
pub(super) fn values_integer<'src, I, E>() -> impl Parser<'src, I, Vec<i32>, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_integer().separated_by(just(',')).at_least(1).collect()
}
