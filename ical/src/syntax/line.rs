// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Content line grammar.
//!
//! Per RFC 5545, a content line has the format:
//!
//! ```text
//! contentline = name *(";" param) ":" value
//! param       = param-name "=" param-value *("," param-value)
//! param-value = paramtext / quoted-string
//! ```
//!
//! Names and parameter names are one or more of letters, digits, `-` and `_`.
//! Unquoted parameter values exclude control characters, `"`, `;`, `:` and
//! `,`; quoted ones exclude control characters and `"`. The value excludes
//! control characters other than horizontal tab and the line-break range
//! `\x0A`-`\x0D`.

use std::iter::Peekable;
use std::ops::Range;

use logos::{Logos, SpannedIter};

use crate::keyword::{KW_BEGIN, KW_END};
use crate::syntax::lexer::Token;

/// A single parsed content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Property or keyword name, original casing preserved
    pub name: String,

    /// Parameters in source order
    pub parameters: Vec<LineParameter>,

    /// Raw value, everything after the first unquoted colon
    pub value: String,
}

impl ParsedLine {
    /// Whether this is a `BEGIN:<component>` line.
    #[must_use]
    pub fn is_begin(&self) -> bool {
        self.name.eq_ignore_ascii_case(KW_BEGIN)
    }

    /// Whether this is an `END:<component>` line.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.name.eq_ignore_ascii_case(KW_END)
    }

    /// Find the first parameter with the given name, case-insensitively.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&LineParameter> {
        find_parameter(&self.parameters, name)
    }
}

/// A parameter of a content line, e.g. `TZID=America/New_York`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineParameter {
    /// Parameter name
    pub name: String,

    /// Parameter values, unquoted, in source order
    pub values: Vec<String>,
}

impl LineParameter {
    /// The first value of this parameter.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Find the first parameter with the given name, case-insensitively.
#[must_use]
pub fn find_parameter<'a>(
    parameters: &'a [LineParameter],
    name: &str,
) -> Option<&'a LineParameter> {
    parameters.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// A line that does not match the content line grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse line: '{line}'")]
pub struct GrammarError {
    /// The offending line
    pub line: String,

    /// Byte offset where the grammar stopped matching
    pub position: usize,
}

type Tokens<'src> = Peekable<SpannedIter<'src, Token<'src>>>;

/// Parse a single unfolded content line.
///
/// ## Errors
///
/// Returns a [`GrammarError`] carrying the literal line if it does not match
/// the content line grammar.
pub fn parse_line(line: &str) -> Result<ParsedLine, GrammarError> {
    let fail = |position: usize| GrammarError {
        line: line.to_owned(),
        position,
    };

    let mut tokens = Token::lexer(line).spanned().peekable();

    let name = match tokens.next() {
        Some((Ok(Token::Word(name)), _)) => name.to_owned(),
        Some((_, span)) => return Err(fail(span.start)),
        None => return Err(fail(0)),
    };

    let mut parameters = Vec::new();
    let value_start = loop {
        match tokens.next() {
            Some((Ok(Token::Semicolon), _)) => {
                let parameter = parse_parameter(line, &mut tokens).map_err(fail)?;
                parameters.push(parameter);
            }
            Some((Ok(Token::Colon), span)) => break span.end,
            Some((_, span)) => return Err(fail(span.start)),
            None => return Err(fail(line.len())),
        }
    };

    // The value is taken verbatim, the lexer is not consulted past the colon
    let value = line.get(value_start..).unwrap_or_default();
    if let Some(offset) = value.find(is_forbidden_in_value) {
        return Err(fail(value_start + offset));
    }

    Ok(ParsedLine {
        name,
        parameters,
        value: value.to_owned(),
    })
}

/// Parse `name=value(,value)*` after the leading semicolon.
///
/// Leaves the delimiter that ends the parameter (`;` or `:`) unconsumed.
fn parse_parameter(line: &str, tokens: &mut Tokens<'_>) -> Result<LineParameter, usize> {
    let name = match tokens.next() {
        Some((Ok(Token::Word(name)), _)) => name.to_owned(),
        Some((_, span)) => return Err(span.start),
        None => return Err(line.len()),
    };

    let mut cursor = match tokens.next() {
        Some((Ok(Token::Equal), span)) => span.end,
        Some((_, span)) => return Err(span.start),
        None => return Err(line.len()),
    };

    let mut values = Vec::new();
    loop {
        values.push(parse_parameter_value(line, tokens, cursor)?);

        match tokens.peek() {
            Some((Ok(Token::Comma), span)) => {
                cursor = span.end;
                tokens.next();
            }
            Some((Ok(Token::Semicolon | Token::Colon), _)) => break,
            Some((_, span)) => return Err(span.start),
            None => return Err(line.len()),
        }
    }

    Ok(LineParameter { name, values })
}

/// Parse one parameter value starting at byte offset `start`.
///
/// Returns the unquoted value.
fn parse_parameter_value(
    line: &str,
    tokens: &mut Tokens<'_>,
    start: usize,
) -> Result<String, usize> {
    if let Some((Ok(Token::DQuote), open)) = tokens.peek() {
        let open = open.end;
        tokens.next();
        loop {
            match tokens.next() {
                Some((Ok(Token::DQuote), close)) => {
                    return Ok(slice(line, open..close.start));
                }
                Some((Ok(_), _)) => {}
                Some((Err(()), span)) => return Err(span.start),
                None => return Err(line.len()),
            }
        }
    }

    // paramtext may be empty
    let mut end = start;
    while let Some((Ok(Token::Word(_) | Token::Text(_) | Token::Equal), span)) = tokens.peek() {
        end = span.end;
        tokens.next();
    }
    Ok(slice(line, start..end))
}

fn slice(line: &str, range: Range<usize>) -> String {
    line.get(range).unwrap_or_default().to_owned()
}

fn is_forbidden_in_value(c: char) -> bool {
    matches!(c, '\x00'..='\x08' | '\x0E'..='\x1F' | '\x7F')
}

#[cfg(test)]
mod tests {
    #![expect(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn parses_simple_property() {
        let line = parse_line("SUMMARY:Team Meeting").unwrap();
        assert_eq!(line.name, "SUMMARY");
        assert!(line.parameters.is_empty());
        assert_eq!(line.value, "Team Meeting");
    }

    #[test]
    fn parses_single_parameter() {
        let line = parse_line("DTSTART;TZID=America/New_York:20250101T090000").unwrap();
        assert_eq!(line.name, "DTSTART");
        assert_eq!(line.parameters.len(), 1);
        assert_eq!(line.parameters[0].name, "TZID");
        assert_eq!(line.parameters[0].values, ["America/New_York"]);
        assert_eq!(line.value, "20250101T090000");
    }

    #[test]
    fn associates_values_with_nearest_parameter_name() {
        let line = parse_line("X-A;P=1,2,3;Q=x;R=:value").unwrap();
        assert_eq!(line.parameters.len(), 3);
        assert_eq!(line.parameters[0].values, ["1", "2", "3"]);
        assert_eq!(line.parameters[1].values, ["x"]);
        assert_eq!(line.parameters[2].values, [""]);
    }

    #[test]
    fn strips_quotes_from_quoted_values() {
        let line = parse_line(r#"ATTENDEE;CN="Doe; John":mailto:john@example.com"#).unwrap();
        assert_eq!(line.parameters[0].values, ["Doe; John"]);
        assert_eq!(line.value, "mailto:john@example.com");
    }

    #[test]
    fn value_may_contain_colons_and_semicolons() {
        let line = parse_line("DESCRIPTION:a:b;c,d=e").unwrap();
        assert_eq!(line.value, "a:b;c,d=e");
    }

    #[test]
    fn unquoted_parameter_value_may_contain_equals() {
        let line = parse_line("X-A;P=a=b:v").unwrap();
        assert_eq!(line.parameters[0].values, ["a=b"]);
    }

    #[test]
    fn empty_value_is_valid() {
        let line = parse_line("SUMMARY:").unwrap();
        assert_eq!(line.value, "");
    }

    #[test]
    fn unicode_is_preserved() {
        let line = parse_line("SUMMARY;X-P=会议:Team会议📅").unwrap();
        assert_eq!(line.parameters[0].values, ["会议"]);
        assert_eq!(line.value, "Team会议📅");
    }

    #[test]
    fn begin_and_end_are_case_insensitive() {
        assert!(parse_line("begin:VEVENT").unwrap().is_begin());
        assert!(parse_line("End:VEVENT").unwrap().is_end());
        assert!(!parse_line("BEGINNING:VEVENT").unwrap().is_begin());
    }

    #[test]
    fn rejects_malformed_lines() {
        let fail_cases = [
            "VERSION 2.0",            // missing colon
            ":value",                 // missing name
            "DTSTART;TZID:20250101",  // missing equals
            "X-A;P=\"unclosed:value", // unterminated quote
            "X-A;P=a\"b:value",       // quote inside paramtext
            "X-A;=x:value",           // empty parameter name
            "X/A:value",              // invalid name character
            "SUMMARY:bad\u{1}value",  // control character in value
            "X-A;P=a\u{7}:value",     // control character in parameter
        ];

        for src in fail_cases {
            let err = parse_line(src).unwrap_err();
            assert_eq!(err.line, src, "{src}");
        }
    }

    #[test]
    fn reports_offending_literal_text() {
        let err = parse_line("VERSION 2.0").unwrap_err();
        assert_eq!(err.to_string(), "could not parse line: 'VERSION 2.0'");
        assert_eq!(err.position, 7);
    }

    #[test]
    fn is_deterministic() {
        let src = r#"ATTENDEE;RSVP=TRUE;CN="A, B";ROLE=REQ-PARTICIPANT:mailto:a@example.com"#;
        assert_eq!(parse_line(src).unwrap(), parse_line(src).unwrap());
    }
}
