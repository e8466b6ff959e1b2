// JSON Schema export for registered types.
//
// The emitted schema accepts the same values `normalize` does. It does not
// describe the pruning: a schema validator keeps extra keys that
// normalization would drop.

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::ir::Ty;
use crate::registry::TypeRegistry;

pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Build a JSON Schema for a single rule.
pub fn schema_for(ty: &Ty) -> Value {
    fn obj_of(props: Vec<(String, Value)>, required: Vec<String>) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::from("object"));
        let mut props_map = Map::new();
        for (k, v) in props {
            props_map.insert(k, v);
        }
        map.insert("properties".into(), Value::Object(props_map));
        map.insert(
            "required".into(),
            Value::Array(required.into_iter().map(Value::from).collect()),
        );
        Value::Object(map)
    }

    match ty {
        Ty::Array => json!({ "type": "array" }),
        Ty::Boolean => json!({ "type": "boolean" }),
        Ty::BooleanLiteral(b) => json!({ "const": b }),
        Ty::Enumeration(members) => json!({ "type": "string", "enum": members }),
        Ty::NumberLiteral(n) => json!({ "const": n }),
        Ty::Number => json!({ "type": "number" }),
        // mirrors the matcher: any container, arrays included
        Ty::Object => json!({ "type": ["object", "array"] }),
        Ty::ObjectPattern(fields) => {
            let props = fields
                .iter()
                .map(|f| {
                    let schema = f.ty.as_ref().map(schema_for).unwrap_or_else(|| json!({}));
                    (f.name.clone(), schema)
                })
                .collect::<Vec<_>>();
            let required = fields.iter().map(|f| f.name.clone()).collect::<Vec<_>>();
            obj_of(props, required)
        }
        Ty::StringLiteral(s) => json!({ "const": s }),
        Ty::String => json!({ "type": "string" }),
    }
}

/// Standalone schema document for the type registered as `name`.
pub fn document_for(registry: &TypeRegistry, name: &str) -> Result<Value> {
    let ty = registry.resolve(name)?;
    let mut doc = Map::new();
    doc.insert("$schema".into(), Value::from(SCHEMA_DIALECT));
    doc.insert("title".into(), Value::from(name));
    if let Value::Object(body) = schema_for(ty) {
        doc.extend(body);
    }
    Ok(Value::Object(doc))
}
