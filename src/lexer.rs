//! Tokenizer for definition source.
//!
//! [`Lexer`] is a lazy iterator over [`Spanned`] tokens. It is `Clone`, so a
//! caller can snapshot a position and restart from it.
use std::fmt;
use std::ops::Range;

use logos::Logos;
use serde_json::Number;

use crate::error::{LexError, Location};

/// Words with a fixed meaning in type position.
pub const KEYWORDS: &[&str] = &[
    "type", "array", "boolean", "number", "object", "string", "enumeration", "true", "false",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Raw failure reported by the token callbacks; positioned by [`Lexer`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexErrorKind {
    #[default]
    Unrecognized,
    InvalidEscape(char),
    InvalidNumber,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[regex(r"//[^\n]*", logos::skip)]
    Comment,

    // Keywords
    #[token("type")]
    Type,
    #[token("array")]
    Array,
    #[token("boolean")]
    Boolean,
    #[token("number")]
    NumberType,
    #[token("object")]
    Object,
    #[token("string")]
    StringType,
    #[token("enumeration")]
    Enumeration,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Symbols
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,

    // Literals
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+\-]?[0-9]+)?", number)]
    Number(Number),

    #[regex(r#""([^"\\\n]|\\.)*""#, string)]
    String(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*", |lex| lex.slice().to_owned())]
    Ident(String),
}

impl Token {
    /// Source spelling of a keyword token.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Token::Type => Some("type"),
            Token::Array => Some("array"),
            Token::Boolean => Some("boolean"),
            Token::NumberType => Some("number"),
            Token::Object => Some("object"),
            Token::StringType => Some("string"),
            Token::Enumeration => Some("enumeration"),
            Token::True => Some("true"),
            Token::False => Some("false"),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => f.write_str("`{`"),
            Token::RBrace => f.write_str("`}`"),
            Token::Colon => f.write_str("`:`"),
            Token::Eq => f.write_str("`=`"),
            Token::Number(n) => write!(f, "number `{n}`"),
            Token::String(s) => write!(f, "string {s:?}"),
            Token::Ident(name) => write!(f, "identifier `{name}`"),
            Token::Comment => f.write_str("comment"),
            keyword => write!(f, "keyword `{}`", keyword.keyword().unwrap_or_default()),
        }
    }
}

fn number(lex: &mut logos::Lexer<Token>) -> Result<Number, LexErrorKind> {
    let text = lex.slice();
    let parsed = if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    } else if let Ok(i) = text.parse::<i64>() {
        Some(Number::from(i))
    } else {
        text.parse::<u64>().ok().map(Number::from)
    };
    parsed.ok_or(LexErrorKind::InvalidNumber)
}

fn string(lex: &mut logos::Lexer<Token>) -> Result<String, LexErrorKind> {
    let raw = lex.slice();
    unescape(&raw[1..raw.len() - 1])
}

fn unescape(body: &str) -> Result<String, LexErrorKind> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(LexErrorKind::InvalidEscape(other)),
            None => return Err(LexErrorKind::InvalidEscape('\\')),
        }
    }
    Ok(out)
}

/// Offset of the raw line break that cut off the string opening `rest`.
fn line_break_in_string(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\n' => return Some(i),
            '"' => return None,
            '\\' => {
                if let Some((j, '\n')) = chars.next() {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

#[derive(Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, inner: Token::lexer(source) }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn location(&self, offset: usize) -> Location {
        Location::from_offset(self.source, offset)
    }

    fn error(&self, kind: LexErrorKind, span: Range<usize>) -> LexError {
        let at = self.location(span.start);
        let rest = &self.source[span.start..];
        match kind {
            LexErrorKind::InvalidEscape(escape) => LexError::InvalidEscape { escape, at },
            LexErrorKind::InvalidNumber => LexError::InvalidNumber {
                text: self.source[span].to_owned(),
                at,
            },
            LexErrorKind::Unrecognized if rest.starts_with('"') => match line_break_in_string(rest) {
                Some(offset) => LexError::NewlineInString {
                    at: self.location(span.start + offset),
                },
                None => LexError::UnterminatedString { at },
            },
            LexErrorKind::Unrecognized => LexError::UnexpectedCharacter {
                ch: rest.chars().next().unwrap_or('\0'),
                at,
            },
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        Some(match result {
            Ok(token) => Ok(Spanned { token, span }),
            Err(kind) => Err(self.error(kind, span)),
        })
    }
}

/// Eagerly tokenize a whole source; stops at the first error.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, LexError> {
    Lexer::new(source).collect()
}
