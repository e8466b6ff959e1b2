use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Deserialize a normalized value, with JSON-path context in error messages.
pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| Error::Deserialize {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Shape {
        center: Point,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Point {
        x: u8,
    }

    #[test]
    fn errors_name_the_offending_path() {
        let err = from_value_with_path::<Shape>(json!({ "center": { "x": 300 } })).unwrap_err();
        let Error::Deserialize { path, .. } = err else { panic!("wrong error: {err:?}") };
        assert_eq!(path, "center.x");
    }
}
