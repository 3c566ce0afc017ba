//! Declarative validation schemas shared by the client and the server.
//!
//! # Design
//! A `Schema` is plain const data, so the route table can hold schemas in
//! `static` items and both sides of the wire validate against the exact same
//! definitions. Validation never coerces: a value either satisfies every
//! constraint or the caller gets back the full list of violations, each
//! tagged with the JSON path it was found at.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

/// Extra format constraint on a string schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Canonical hyphenated UUID, e.g. `b5f713b0-6247-496d-9b02-3e1faf3ebbd3`.
    Uuid,
}

/// Shape of an untyped JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    String {
        min_len: usize,
        format: Option<StringFormat>,
    },
    Boolean,
    Integer,
    Array(&'static Schema),
    /// Unknown keys are ignored; declared fields are checked in order.
    Object(&'static [Field]),
    /// Empty payload. Only JSON `null` (or an empty body) satisfies it.
    Void,
}

/// A named member of an object schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            schema,
            required: false,
        }
    }
}

impl Schema {
    pub const fn string() -> Self {
        Self::String {
            min_len: 0,
            format: None,
        }
    }

    pub const fn string_min(min_len: usize) -> Self {
        Self::String {
            min_len,
            format: None,
        }
    }

    pub const fn uuid() -> Self {
        Self::String {
            min_len: 0,
            format: Some(StringFormat::Uuid),
        }
    }

    /// Check `value` against this schema, collecting every violated constraint.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        self.collect(value, "", &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Validate, then deserialize into `T`.
    pub fn parse<T: DeserializeOwned>(&self, value: &Value) -> Result<T, ValidationError> {
        self.validate(value)?;
        T::deserialize(value).map_err(|e| ValidationError::single("", e.to_string()))
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Void => "void",
        }
    }

    fn collect(&self, value: &Value, path: &str, issues: &mut Vec<Issue>) {
        match (self, value) {
            (Self::Void, Value::Null) | (Self::Boolean, Value::Bool(_)) => {}
            (Self::Integer, Value::Number(n)) => {
                if !(n.is_i64() || n.is_u64()) {
                    issues.push(Issue::new(path, "Expected integer, received float"));
                }
            }
            (Self::String { min_len, format }, Value::String(s)) => {
                if s.chars().count() < *min_len {
                    issues.push(Issue::new(
                        path,
                        format!("String must contain at least {min_len} character(s)"),
                    ));
                }
                if let Some(StringFormat::Uuid) = format {
                    if !is_uuid(s) {
                        issues.push(Issue::new(path, "Invalid uuid"));
                    }
                }
            }
            (Self::Array(item), Value::Array(values)) => {
                for (i, v) in values.iter().enumerate() {
                    item.collect(v, &format!("{path}[{i}]"), issues);
                }
            }
            (Self::Object(fields), Value::Object(map)) => {
                for field in fields.iter() {
                    let field_path = child_path(path, field.name);
                    match map.get(field.name) {
                        Some(v) => field.schema.collect(v, &field_path, issues),
                        None if field.required => issues.push(Issue::new(&field_path, "Required")),
                        None => {}
                    }
                }
            }
            (expected, other) => issues.push(Issue::new(
                path,
                format!(
                    "Expected {}, received {}",
                    expected.type_name(),
                    json_type_name(other)
                ),
            )),
        }
    }
}

fn is_uuid(s: &str) -> bool {
    s.len() == 36 && Uuid::try_parse(s).is_ok()
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Dotted JSON path, empty for the root value.
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// All constraints a value failed. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        debug_assert!(!issues.is_empty());
        Self { issues }
    }

    pub fn single(path: &str, message: impl Into<String>) -> Self {
        Self::new(vec![Issue::new(path, message)])
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Re-root every issue under `prefix`, used for named parameters.
    pub fn prefixed(self, prefix: &str) -> Self {
        let issues = self
            .issues
            .into_iter()
            .map(|issue| Issue {
                path: if issue.path.is_empty() {
                    prefix.to_string()
                } else if issue.path.starts_with('[') {
                    format!("{prefix}{}", issue.path)
                } else {
                    format!("{prefix}.{}", issue.path)
                },
                message: issue.message,
            })
            .collect();
        Self { issues }
    }

    pub fn extend(&mut self, other: ValidationError) {
        self.issues.extend(other.issues);
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
