/// Result of checking one instance against its schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub tag: String,
    /// Number of rules evaluated.
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violation descriptions joined into one line.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single structural mismatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required field is absent or null.
    Missing,
    /// A field is present with the wrong shape.
    WrongShape,
    /// A closed schema found a field it does not declare.
    Unexpected,
}
