use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::report::{ValidationReport, Violation, ViolationKind};
use crate::shape::{describe, Shape};

/// Rule for one field of an instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub shape: Shape,
    /// Required fields must be present and, unless the shape accepts null,
    /// non-null.
    pub required: bool,
}

/// Structural schema declared by a registered type.
///
/// ```
/// use keepsake_schema::{Schema, Shape};
/// use serde_json::json;
///
/// let schema = Schema::new().required("v", Shape::Number);
/// let fields = json!({"v": "not-a-number"});
/// let report = schema.validate("Gauge", fields.as_object().unwrap());
/// assert!(!report.is_valid());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub rules: Vec<FieldRule>,
    /// Reject fields that no rule names.
    #[serde(default)]
    pub closed: bool,
}

impl Schema {
    /// Open schema with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `name` to be present with `shape`.
    pub fn required(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.rules.push(FieldRule {
            name: name.into(),
            shape,
            required: true,
        });
        self
    }

    /// Allow `name` to be absent or null, otherwise matching `shape`.
    pub fn optional(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.rules.push(FieldRule {
            name: name.into(),
            shape,
            required: false,
        });
        self
    }

    /// Reject undeclared fields.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Names of every field a rule refers to.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Check an instance's field view.
    pub fn validate(&self, tag: &str, fields: &Map<String, Value>) -> ValidationReport {
        let mut violations = Vec::new();

        for rule in &self.rules {
            match fields.get(&rule.name) {
                None if rule.required => violations.push(Violation {
                    field: rule.name.clone(),
                    kind: ViolationKind::Missing,
                    description: format!("{tag}.{} is required", rule.name),
                }),
                None => {}
                Some(Value::Null) if !rule.shape.accepts_null() => {
                    if rule.required {
                        violations.push(Violation {
                            field: rule.name.clone(),
                            kind: ViolationKind::Missing,
                            description: format!("{tag}.{} is required but null", rule.name),
                        });
                    }
                }
                Some(value) if !rule.shape.matches(value) => violations.push(Violation {
                    field: rule.name.clone(),
                    kind: ViolationKind::WrongShape,
                    description: format!(
                        "{tag}.{} expected {:?}, found {}",
                        rule.name,
                        rule.shape,
                        describe(value)
                    ),
                }),
                Some(_) => {}
            }
        }

        if self.closed {
            for name in fields.keys() {
                if !self.rules.iter().any(|rule| &rule.name == name) {
                    violations.push(Violation {
                        field: name.clone(),
                        kind: ViolationKind::Unexpected,
                        description: format!("{tag}.{name} is not declared"),
                    });
                }
            }
        }

        ValidationReport {
            tag: tag.to_string(),
            checked: self.rules.len(),
            violations,
        }
    }
}
