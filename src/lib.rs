//! Declarative shape definitions for JSON values.
//!
//! Definitions are written in a small language:
//!
//! ```text
//! type Circle = { cx: number cy: number style }
//! type Mode   = enumeration { fill stroke "fill and stroke" }
//! ```
//!
//! A [`Normalizer`] collects definitions and matches `serde_json::Value`s
//! against them. Matching never coerces; object patterns prune every key
//! they do not list.
//!
//! ```
//! use serde_json::json;
//! use shapedef::{Normalizer, Outcome};
//!
//! let normalizer = Normalizer::from_source("type Circle = { cx: number cy: number }")?;
//! let outcome = normalizer.normalize(&json!({ "cx": 10, "cy": 20, "radius": 5 }), "Circle")?;
//! assert_eq!(outcome, Outcome::Normalized(json!({ "cx": 10, "cy": 20 })));
//! # Ok::<(), shapedef::Error>(())
//! ```
pub mod error;
pub mod ir;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod path_de;
pub mod registry;
pub mod schema;
pub mod stack;

pub use error::{Error, LexError, Location, ParseError, Result};
pub use ir::{Field, Ty};
pub use normalize::{normalize_value, Mismatch, Normalizer, Outcome, Reason, ValueKind};
pub use parser::{parse_definitions, parse_type};
pub use registry::TypeRegistry;
