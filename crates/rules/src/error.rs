//! Error types reported by the rule engine.
//!
//! Violations are data, compile failures are programming errors in a rule
//! declaration. Both are unified under [`Error`].

use std::fmt;

use thiserror::Error;

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Key: '{namespace}' Error:Field validation for '{field}' failed on the '{tag}' tag")]
pub struct FieldError {
    namespace: String,
    field: String,
    tag: String,
    param: Option<String>,
}

impl FieldError {
    pub(crate) fn new(
        namespace: String,
        field: &str,
        tag: &str,
        param: Option<&str>,
    ) -> Self {
        Self {
            namespace,
            field: field.to_string(),
            tag: tag.to_string(),
            param: param.map(str::to_string),
        }
    }

    /// Dotted path from the validated record, e.g. `User.Address.City`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Field name as declared on its record.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Name of the rule that failed.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }
}

/// All field errors found on one record, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A rule expression that cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Undefined validation rule '{rule}' on field '{record}.{field}'")]
    UnknownRule {
        record: String,
        field: String,
        rule: String,
    },

    #[error("Invalid parameter '{param}' for rule '{rule}' on field '{record}.{field}'")]
    InvalidParam {
        record: String,
        field: String,
        rule: String,
        param: String,
    },

    #[error("Rule '{rule}' on field '{record}.{field}' requires a parameter")]
    MissingParam {
        record: String,
        field: String,
        rule: String,
    },
}

/// Outcome of a failed record evaluation.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("{0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
