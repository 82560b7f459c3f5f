// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lexer for a single iCalendar content line as defined in RFC 5545

use std::fmt::{self, Display};

use logos::Logos;

/// Token emitted by the content line lexer
///
/// Control characters other than horizontal tab match no token and surface
/// as lexer errors.
#[derive(PartialEq, Eq, Clone, Copy, Logos)]
pub enum Token<'a> {
    /// Double Quote ("), decimal codepoint 22
    #[token(r#"""#)]
    DQuote,

    /// Comma (,), decimal codepoint 44
    #[token(",")]
    Comma,

    /// Colon (:), decimal codepoint 58
    #[token(":")]
    Colon,

    /// Semicolon (;), decimal codepoint 59
    #[token(";")]
    Semicolon,

    /// Equal sign (=), decimal codepoint 61
    #[token("=")]
    Equal,

    /// Identifier characters: 0-9, A-Z, a-z, hyphen, underscore
    #[regex("[-0-9A-Za-z_]+")]
    Word(&'a str),

    /// Any other run of safe characters, including horizontal tab and
    /// NON-US-ASCII
    #[regex(r#"[^-0-9A-Za-z_",:;=\x00-\x08\x0A-\x1F\x7F]+"#)]
    Text(&'a str),
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DQuote => write!(f, "DQuote"),
            Self::Comma => write!(f, "Comma"),
            Self::Colon => write!(f, "Colon"),
            Self::Semicolon => write!(f, "Semicolon"),
            Self::Equal => write!(f, "Equal"),
            Self::Word(s) => write!(f, "Word({s})"),
            Self::Text(s) => write!(f, "Text({s})"),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::Token::*;
    use super::*;

    fn lex(src: &str) -> Vec<Result<Token<'_>, ()>> {
        Token::lexer(src).collect()
    }

    #[test]
    fn tokenizes_delimiters() {
        assert_eq!(
            lex(r#"";:,="#),
            vec![Ok(DQuote), Ok(Semicolon), Ok(Colon), Ok(Comma), Ok(Equal)]
        );
    }

    #[test]
    fn tokenizes_identifier_as_single_word() {
        assert_eq!(lex("X-WR-CAL_NAME"), vec![Ok(Word("X-WR-CAL_NAME"))]);
        assert_eq!(lex("DTSTART;TZID"), vec![
            Ok(Word("DTSTART")),
            Ok(Semicolon),
            Ok(Word("TZID")),
        ]);
    }

    #[test]
    fn tokenizes_text_runs() {
        assert_eq!(lex("America/New_York"), vec![
            Ok(Word("America")),
            Ok(Text("/")),
            Ok(Word("New_York")),
        ]);
        assert_eq!(lex("a b\tc"), vec![
            Ok(Word("a")),
            Ok(Text(" ")),
            Ok(Word("b")),
            Ok(Text("\t")),
            Ok(Word("c")),
        ]);
        assert_eq!(lex("会议"), vec![Ok(Text("会议"))]);
    }

    #[test]
    fn rejects_control_characters() {
        for c in (0x00_u8..=0x08).chain(0x0A..=0x1F).chain([0x7F]) {
            let src = (c as char).to_string();
            assert_eq!(lex(&src), vec![Err(())], "U+{c:02X}");
        }
    }
}
