//! Named type definitions.
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ir::Ty;

/// Type name → root rule, in first-definition order.
///
/// There is no removal and no internal locking: fill it through `&mut`,
/// then share it read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: IndexMap<String, Ty>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. Returns the rule it replaced, if any; a
    /// replaced name keeps its original position.
    pub fn define(&mut self, name: impl Into<String>, ty: Ty) -> Option<Ty> {
        let name = name.into();
        let previous = self.types.insert(name.clone(), ty);
        if previous.is_some() {
            warn!(%name, "type redefined; the new definition replaces the old one");
        } else {
            debug!(%name, "type defined");
        }
        previous
    }

    /// Commit a parsed batch in order.
    pub fn extend(&mut self, definitions: impl IntoIterator<Item = (String, Ty)>) {
        for (name, ty) in definitions {
            self.define(name, ty);
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&Ty> {
        self.types
            .get(name)
            .ok_or_else(|| Error::TypeNotFound(name.to_owned()))
    }

    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Ty)> {
        self.types.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl fmt::Display for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, ty) in self.iter() {
            writeln!(f, "type {name} = {ty}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Field;
    use crate::parser::parse_definitions;

    #[test]
    fn resolve_reports_unknown_names() {
        let mut reg = TypeRegistry::new();
        reg.define("A", Ty::String);
        assert_eq!(reg.resolve("A"), Ok(&Ty::String));
        assert_eq!(reg.resolve("B"), Err(Error::TypeNotFound("B".into())));
    }

    #[test]
    fn redefinition_is_last_write_wins() {
        let mut reg = TypeRegistry::new();
        assert_eq!(reg.define("A", Ty::String), None);
        reg.define("B", Ty::Array);
        assert_eq!(reg.define("A", Ty::Number), Some(Ty::String));
        assert_eq!(reg.get("A"), Some(&Ty::Number));
        assert_eq!(reg.names().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn display_reparses_to_the_same_registry() {
        let mut reg = TypeRegistry::new();
        reg.define("Point", Ty::ObjectPattern(vec![
            Field::new("x", Some(Ty::Number)),
            Field::new("y", Some(Ty::Number)),
            Field::new("label", None),
        ]));
        reg.define("Flag", Ty::BooleanLiteral(false));
        let src = reg.to_string();
        assert_eq!(src, "type Point = { x: number y: number label }\ntype Flag = false\n");

        let mut again = TypeRegistry::new();
        again.extend(parse_definitions(&src).unwrap());
        assert_eq!(again, reg);
    }
}
