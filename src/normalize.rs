//! Normalization: match a JSON value against a type rule.
//!
//! Matching never coerces. Scalars pass through unchanged, arrays and plain
//! `object` values are copied, and object patterns build a new object that
//! holds only the listed keys. A failed match is an ordinary [`Outcome`],
//! not an error; the only error `normalize` itself raises is an unknown type
//! name.
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::ir::{Field, Ty};
use crate::parser::parse_definitions;
use crate::registry::TypeRegistry;
use crate::stack::ensure_sufficient_stack;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Normalized(Value),
    Mismatch(Mismatch),
}

/// Why a value was rejected, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// JSON Pointer to the rejected sub-value (`""` is the root).
    pub path: String,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    WrongKind {
        expected: &'static str,
        found: ValueKind,
    },
    /// Right kind, wrong value (literals and enumerations).
    NotEqual { expected: String, found: String },
    MissingProperty { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Outcome {
    pub fn is_normalized(&self) -> bool {
        matches!(self, Outcome::Normalized(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Normalized(v) => Some(v),
            Outcome::Mismatch(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Normalized(v) => Some(v),
            Outcome::Mismatch(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Value, Mismatch> {
        match self {
            Outcome::Normalized(v) => Ok(v),
            Outcome::Mismatch(m) => Err(m),
        }
    }
}

impl Mismatch {
    fn here(reason: Reason) -> Self {
        Self { path: String::new(), reason }
    }

    /// Re-root this mismatch under property `name`.
    fn within(mut self, name: &str) -> Self {
        let escaped = name.replace('~', "~0").replace('/', "~1");
        self.path = format!("/{escaped}{}", self.path);
        self
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.path.is_empty() { "(root)" } else { &self.path };
        write!(f, "at {at}: {}", self.reason)
    }
}

impl std::error::Error for Mismatch {}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::WrongKind { expected, found } => write!(f, "expected {expected}, found {found}"),
            Reason::NotEqual { expected, found } => write!(f, "expected {expected}, found {found}"),
            Reason::MissingProperty { name } => write!(f, "missing required property `{name}`"),
        }
    }
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        })
    }
}

// ------------------------------- Matching -------------------------------- //

/// Match `value` against `ty`, building the normalized value.
pub fn normalize_value(value: &Value, ty: &Ty) -> Outcome {
    match match_value(value, ty) {
        Ok(v) => Outcome::Normalized(v),
        Err(m) => Outcome::Mismatch(m),
    }
}

fn wrong_kind(ty: &Ty, value: &Value) -> Mismatch {
    Mismatch::here(Reason::WrongKind {
        expected: ty.kind_name(),
        found: ValueKind::of(value),
    })
}

fn not_equal(ty: &Ty, value: &Value) -> Mismatch {
    Mismatch::here(Reason::NotEqual {
        expected: ty.to_string(),
        found: value.to_string(),
    })
}

fn match_value(value: &Value, ty: &Ty) -> Result<Value, Mismatch> {
    match (ty, value) {
        (Ty::Array, Value::Array(_)) => Ok(value.clone()),
        (Ty::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (Ty::BooleanLiteral(b), Value::Bool(v)) if v == b => Ok(Value::Bool(*b)),
        (Ty::Enumeration(members), Value::String(s)) if members.contains(s) => Ok(value.clone()),
        (Ty::NumberLiteral(n), Value::Number(v)) if numbers_equal(v, n) => Ok(Value::Number(n.clone())),
        (Ty::Number, Value::Number(_)) => Ok(value.clone()),
        // `object` takes any container, arrays included.
        (Ty::Object, Value::Array(_) | Value::Object(_)) => Ok(value.clone()),
        (Ty::ObjectPattern(fields), Value::Object(map)) => match_pattern(map, fields),
        (Ty::StringLiteral(s), Value::String(v)) if v == s => Ok(value.clone()),
        (Ty::String, Value::String(_)) => Ok(value.clone()),

        // right kind, wrong value
        (Ty::BooleanLiteral(_), Value::Bool(_))
        | (Ty::Enumeration(_), Value::String(_))
        | (Ty::NumberLiteral(_), Value::Number(_))
        | (Ty::StringLiteral(_), Value::String(_)) => Err(not_equal(ty, value)),

        _ => Err(wrong_kind(ty, value)),
    }
}

fn match_pattern(map: &Map<String, Value>, fields: &[Field]) -> Result<Value, Mismatch> {
    let mut out = Map::with_capacity(fields.len());
    for field in fields {
        let Some(value) = map.get(&field.name) else {
            return Err(Mismatch::here(Reason::MissingProperty {
                name: field.name.clone(),
            }));
        };
        let value = match &field.ty {
            None => value.clone(),
            Some(ty) => ensure_sufficient_stack(|| match_value(value, ty))
                .map_err(|m| m.within(&field.name))?,
        };
        out.insert(field.name.clone(), value);
    }
    Ok(Value::Object(out))
}

/// Numeric equality across integer and float representations.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

// ------------------------------- Front API ------------------------------- //

/// Definitions plus the matcher.
///
/// Add definitions first (`&mut self`), then share freely: normalization
/// only reads.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    registry: TypeRegistry,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(source: &str) -> Result<Self> {
        let mut normalizer = Self::new();
        normalizer.add_definitions_from_source(source)?;
        Ok(normalizer)
    }

    /// Parse `source` and register every declaration in it.
    ///
    /// The batch is all-or-nothing: if any part of `source` fails to lex or
    /// parse, the registry is left exactly as it was. Redeclaring an existing
    /// name replaces it.
    pub fn add_definitions_from_source(&mut self, source: &str) -> Result<()> {
        let definitions = parse_definitions(source)?;
        debug!(count = definitions.len(), "committing type definitions");
        self.registry.extend(definitions);
        Ok(())
    }

    pub fn define(&mut self, name: impl Into<String>, ty: Ty) -> Option<Ty> {
        self.registry.define(name, ty)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Normalize `value` against the type registered as `type_name`.
    ///
    /// `Err` only for an unknown type name; a value that does not fit is
    /// `Ok(Outcome::Mismatch(..))`.
    pub fn normalize(&self, value: &Value, type_name: &str) -> Result<Outcome> {
        let ty = self.registry.resolve(type_name)?;
        let outcome = normalize_value(value, ty);
        if let Outcome::Mismatch(mismatch) = &outcome {
            trace!(type_name, %mismatch, "value rejected");
        }
        Ok(outcome)
    }

    /// Normalize, then deserialize the result into `T`.
    ///
    /// Here a mismatch is an error, since there is no `T` to hand back.
    pub fn normalize_into<T: DeserializeOwned>(&self, value: &Value, type_name: &str) -> Result<T> {
        match self.normalize(value, type_name)? {
            Outcome::Normalized(v) => crate::path_de::from_value_with_path(v),
            Outcome::Mismatch(mismatch) => Err(Error::Mismatch {
                type_name: type_name.to_owned(),
                mismatch,
            }),
        }
    }
}
