//! Recursive structural validation of semi-structured model output.
//!
//! Schemas are a small tagged union over JSON node kinds. Validation never
//! stops at the first problem: every error found is returned as a
//! `"{path}: message"` string so the full list can be logged or echoed back
//! into a prompt.

use serde_json::{Map, Value};

/// Kind of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    Null,
    /// Accepts any value without a type check
    Any,
    Array {
        items: Option<Box<SchemaNode>>,
    },
    Object {
        /// Declared properties, in declaration order
        properties: Vec<(String, SchemaNode)>,
        /// Keys that must be present on the object
        required: Vec<String>,
    },
}

impl SchemaKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Null => "null",
            SchemaKind::Any => "any",
            SchemaKind::Array { .. } => "array",
            SchemaKind::Object { .. } => "object",
        }
    }
}

/// A node in a validation schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    /// Property-level required flag, checked by the parent object
    pub required: bool,
    /// Whether null is accepted in place of the declared kind
    pub nullable: bool,
    /// Allowed values, if constrained
    pub enum_values: Option<Vec<Value>>,
}

impl SchemaNode {
    fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
            nullable: false,
            enum_values: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    pub fn null() -> Self {
        Self::of(SchemaKind::Null)
    }

    pub fn any() -> Self {
        Self::of(SchemaKind::Any)
    }

    /// Array whose elements all match `items`.
    pub fn array(items: SchemaNode) -> Self {
        Self::of(SchemaKind::Array {
            items: Some(Box::new(items)),
        })
    }

    /// Array with unconstrained elements.
    pub fn any_array() -> Self {
        Self::of(SchemaKind::Array { items: None })
    }

    /// Object with no declared properties yet.
    pub fn object() -> Self {
        Self::of(SchemaKind::Object {
            properties: Vec::new(),
            required: Vec::new(),
        })
    }

    /// Declare a property. No-op on non-object nodes.
    pub fn property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        if let SchemaKind::Object { properties, .. } = &mut self.kind {
            properties.push((name.into(), node));
        }
        self
    }

    /// Object-level list of required keys. No-op on non-object nodes.
    pub fn require<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let SchemaKind::Object { required, .. } = &mut self.kind {
            required.extend(keys.into_iter().map(Into::into));
        }
        self
    }

    /// Mark this node as required on its parent object.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept null in place of the declared kind.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Constrain the value to one of the given strings.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(|v| Value::String(v.into())).collect());
        self
    }

    /// Validate `data` against this node, rooted at `"root"`.
    pub fn validate(&self, data: &Value) -> ValidationReport {
        validate(data, self, "root")
    }
}

/// Outcome of validating a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// All errors joined for a single-line message.
    pub fn joined(&self) -> String {
        self.errors.join("; ")
    }
}

/// Validate `data` against `schema`, reporting error paths relative to `path`.
pub fn validate(data: &Value, schema: &SchemaNode, path: &str) -> ValidationReport {
    let mut errors = Vec::new();
    check(data, schema, path, &mut errors);
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

/// Runtime type name of a JSON value.
pub fn actual_type(data: &Value) -> &'static str {
    match data {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check(data: &Value, schema: &SchemaNode, path: &str, errors: &mut Vec<String>) {
    if schema.kind != SchemaKind::Any {
        let expected = schema.kind.type_name();

        if data.is_null() {
            if schema.nullable || schema.kind == SchemaKind::Null {
                return;
            }
            errors.push(format!("{}: Expected {}, got null", path, expected));
            return;
        }

        let actual = actual_type(data);
        if actual != expected {
            errors.push(format!("{}: Expected {}, got {}", path, expected, actual));
            return;
        }
    }

    if let Some(allowed) = &schema.enum_values {
        if !allowed.contains(data) {
            errors.push(format!(
                "{}: Invalid value {}, expected one of: {}",
                path,
                data,
                allowed.iter().map(display_value).collect::<Vec<_>>().join(", ")
            ));
        }
    }

    match (&schema.kind, data) {
        (SchemaKind::Object { properties, required }, Value::Object(map)) => {
            check_object(map, properties, required, path, errors);
        }
        (SchemaKind::Array { items: Some(items) }, Value::Array(elements)) => {
            for (i, element) in elements.iter().enumerate() {
                check(element, items, &format!("{}[{}]", path, i), errors);
            }
        }
        _ => {}
    }
}

fn check_object(
    map: &Map<String, Value>,
    properties: &[(String, SchemaNode)],
    required: &[String],
    path: &str,
    errors: &mut Vec<String>,
) {
    let mut reported: Vec<&str> = Vec::new();

    for key in required {
        if !map.contains_key(key) {
            errors.push(format!("{}.{}: Missing required field", path, key));
            reported.push(key);
        }
    }

    for (key, node) in properties {
        if node.required && !map.contains_key(key) && !reported.contains(&key.as_str()) {
            errors.push(format!("{}.{}: Missing required field", path, key));
        }
    }

    for (key, node) in properties {
        if let Some(value) = map.get(key) {
            check(value, node, &format!("{}.{}", path, key), errors);
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> SchemaNode {
        SchemaNode::object()
            .require(["name", "tags"])
            .property("name", SchemaNode::string())
            .property("age", SchemaNode::number().required())
            .property("nickname", SchemaNode::string().nullable())
            .property("tags", SchemaNode::array(SchemaNode::string()))
            .property("role", SchemaNode::string().one_of(["admin", "user"]))
    }

    #[test]
    fn test_well_typed_data_is_valid() {
        let data = json!({
            "name": "Ada",
            "age": 36,
            "nickname": null,
            "tags": ["math", "engines"],
            "role": "admin"
        });

        let report = person_schema().validate(&data);
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_top_level_mismatch_reports_single_root_error() {
        let report = person_schema().validate(&json!([{"name": 1}]));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["root: Expected object, got array".to_string()]);

        let report = person_schema().validate(&json!(null));
        assert_eq!(report.errors, vec!["root: Expected object, got null".to_string()]);
    }

    #[test]
    fn test_missing_fields_reported_once() {
        // "name" is required by the object list, "age" by the property flag
        let report = person_schema().validate(&json!({ "tags": [] }));
        assert_eq!(
            report.errors,
            vec![
                "root.name: Missing required field".to_string(),
                "root.age: Missing required field".to_string(),
            ]
        );

        let schema = SchemaNode::object()
            .require(["id"])
            .property("id", SchemaNode::string().required());
        let report = schema.validate(&json!({}));
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_errors_accumulate_across_nodes() {
        let data = json!({
            "name": 42,
            "age": "old",
            "tags": ["ok", 7, false],
            "role": "root"
        });

        let report = person_schema().validate(&data);
        assert_eq!(
            report.errors,
            vec![
                "root.name: Expected string, got number".to_string(),
                "root.age: Expected number, got string".to_string(),
                "root.tags[1]: Expected string, got number".to_string(),
                "root.tags[2]: Expected string, got boolean".to_string(),
                "root.role: Invalid value \"root\", expected one of: admin, user".to_string(),
            ]
        );
    }

    #[test]
    fn test_enum_error_does_not_stop_descent() {
        let schema = SchemaNode::object()
            .one_of(["never"])
            .property("inner", SchemaNode::number());
        let report = schema.validate(&json!({ "inner": "x" }));
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[1].starts_with("root.inner: Expected number"));
    }

    #[test]
    fn test_null_and_any_kinds() {
        assert!(SchemaNode::null().validate(&json!(null)).valid);
        assert!(!SchemaNode::null().validate(&json!(0)).valid);
        assert!(SchemaNode::any().validate(&json!({"a": [1, 2]})).valid);
        assert!(SchemaNode::any().validate(&json!(null)).valid);
        assert!(!SchemaNode::string().validate(&json!(null)).valid);
        assert!(SchemaNode::string().nullable().validate(&json!(null)).valid);
    }

    #[test]
    fn test_custom_root_path() {
        let report = validate(&json!("x"), &SchemaNode::number(), "response");
        assert_eq!(report.errors, vec!["response: Expected number, got string".to_string()]);
        assert_eq!(report.joined(), "response: Expected number, got string");
    }
}
