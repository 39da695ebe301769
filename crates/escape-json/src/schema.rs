//! Manifest schema validation
//!
//! One canonical schema ships with the crate (`res/composer-schema.json`).
//! It is parsed on every call so [`SchemaMode::Lax`] can relax a private copy.

use crate::error::{JsonFileError, Result};
use crate::options::SchemaMode;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

/// Raw text of the bundled manifest schema
pub const MANIFEST_SCHEMA: &str = include_str!("../res/composer-schema.json");

/// Properties that lax mode stops requiring
const LAX_OPTIONAL: &[&str] = &["name", "description"];

/// Parse the bundled schema and adjust it for `mode`
///
/// # Errors
/// Returns [`JsonFileError::Schema`] if the bundled text is not valid JSON.
pub fn manifest_schema(mode: SchemaMode) -> Result<Value> {
    let mut schema: Value = serde_json::from_str(MANIFEST_SCHEMA)
        .map_err(|e| JsonFileError::Schema(format!("invalid JSON: {e}")))?;
    if mode == SchemaMode::Lax {
        relax(&mut schema);
    }
    Ok(schema)
}

/// Allow unknown top-level properties and stop requiring `name`/`description`
pub fn relax(schema: &mut Value) {
    let Value::Object(root) = schema else {
        return;
    };
    root.insert("additionalProperties".to_string(), Value::Bool(true));
    if let Some(Value::Array(required)) = root.get_mut("required") {
        required.retain(|field| !field.as_str().is_some_and(|f| LAX_OPTIONAL.contains(&f)));
    }
}

/// Validate `instance` against `schema`
///
/// Returns one line per violation, `"<property>: <message>"`, with the
/// property prefix omitted for violations at the document root. Nested
/// properties are joined with dots (`require.php`).
///
/// # Errors
/// Returns [`JsonFileError::Schema`] if `schema` itself does not compile.
pub fn violations(instance: &Value, schema: &Value) -> Result<Vec<String>> {
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|e| JsonFileError::Schema(e.to_string()))?;

    let lines = match compiled.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|e| format_violation(&e)).collect(),
    };
    Ok(lines)
}

fn format_violation(error: &ValidationError<'_>) -> String {
    let property = error.instance_path.clone().into_vec().join(".");
    if property.is_empty() {
        error.to_string()
    } else {
        format!("{property}: {error}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundled_schema_parses_and_compiles() {
        let schema = manifest_schema(SchemaMode::Strict).unwrap();
        assert_eq!(schema["type"], "object");
        assert!(violations(&json!({"name": "a/b", "description": "x"}), &schema)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn relax_touches_only_lax_fields() {
        let mut schema = json!({
            "additionalProperties": false,
            "required": ["name", "description", "type"]
        });
        relax(&mut schema);
        assert_eq!(schema["additionalProperties"], true);
        assert_eq!(schema["required"], json!(["type"]));
    }

    #[test]
    fn relax_ignores_non_objects() {
        let mut schema = json!(true);
        relax(&mut schema);
        assert_eq!(schema, json!(true));
    }

    #[test]
    fn root_violation_has_no_prefix() {
        let schema = manifest_schema(SchemaMode::Strict).unwrap();
        let lines = violations(&json!({"description": "x"}), &schema).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\"name\""), "{lines:?}");
        assert!(!lines[0].starts_with(':'));
    }

    #[test]
    fn nested_violation_is_prefixed() {
        let schema = manifest_schema(SchemaMode::Strict).unwrap();
        let doc = json!({"name": "a/b", "description": "x", "require": {"php": 5}});
        let lines = violations(&doc, &schema).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("require.php: "), "{lines:?}");
    }

    #[test]
    fn lax_accepts_unknown_properties() {
        let doc = json!({"custom": 1});
        let strict = manifest_schema(SchemaMode::Strict).unwrap();
        let lax = manifest_schema(SchemaMode::Lax).unwrap();
        assert!(!violations(&doc, &strict).unwrap().is_empty());
        assert!(violations(&doc, &lax).unwrap().is_empty());
    }

    #[test]
    fn broken_schema_is_reported() {
        let schema = json!({"type": 12});
        assert!(matches!(
            violations(&json!({}), &schema),
            Err(JsonFileError::Schema(_))
        ));
    }
}
