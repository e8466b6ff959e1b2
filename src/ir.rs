// Parsed type model. One `Ty` per type expression in definition source.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::lexer::is_keyword;

/// A single type rule.
///
/// Note the asymmetry between the container kinds: `Object` accepts arrays
/// as well as objects (it only rules out scalars), `Array` accepts arrays
/// only, and `ObjectPattern` accepts objects only because it looks up keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Ty {
    Array,
    Boolean,
    BooleanLiteral(bool),
    /// Ordered, without duplicates.
    Enumeration(Vec<String>),
    /// Kept as written so a match hands back the source spelling (`10`, not `10.0`).
    NumberLiteral(Number),
    Number,
    Object,
    ObjectPattern(Vec<Field>),
    StringLiteral(String),
    String,
}

/// One entry of an object pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// `None`: presence is enough, the value is copied through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Ty>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Option<Ty>) -> Self {
        Self { name: name.into(), ty }
    }
}

impl Ty {
    /// Kind of JSON value this rule can ever accept, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Ty::Array => "array",
            Ty::Boolean | Ty::BooleanLiteral(_) => "boolean",
            Ty::Enumeration(_) | Ty::StringLiteral(_) | Ty::String => "string",
            Ty::NumberLiteral(_) | Ty::Number => "number",
            Ty::Object => "array or object",
            Ty::ObjectPattern(_) => "object",
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CANONICAL SOURCE
// ————————————————————————————————————————————————————————————————————————————

/// A word the lexer reads back as one identifier or keyword token.
pub(crate) fn is_bare_word(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Names print bare unless they could be misread; keywords are quoted too.
fn write_word(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if is_bare_word(s) && !is_keyword(s) { f.write_str(s) } else { write_quoted(f, s) }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Array => f.write_str("array"),
            Ty::Boolean => f.write_str("boolean"),
            Ty::BooleanLiteral(b) => write!(f, "{b}"),
            Ty::Enumeration(members) => {
                f.write_str("enumeration {")?;
                for m in members {
                    f.write_str(" ")?;
                    write_word(f, m)?;
                }
                f.write_str(" }")
            }
            Ty::NumberLiteral(n) => write!(f, "{n}"),
            Ty::Number => f.write_str("number"),
            Ty::Object => f.write_str("object"),
            Ty::ObjectPattern(fields) => {
                f.write_str("{")?;
                for field in fields {
                    f.write_str(" ")?;
                    write_word(f, &field.name)?;
                    if let Some(ty) = &field.ty {
                        write!(f, ": {ty}")?;
                    }
                }
                f.write_str(" }")
            }
            Ty::StringLiteral(s) => write_quoted(f, s),
            Ty::String => f.write_str("string"),
        }
    }
}
