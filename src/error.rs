//! Validation outcomes returned by the [`Validator`](crate::Validator).
//!
//! A failure is one of a closed set of variants, each translated to a gRPC
//! status by [`From<ValidationError> for tonic::Status`](crate::status).

use std::fmt;

use thiserror::Error;
use validate_rules::{CompileError, FieldErrors};

/// Why a value failed validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One record violated one or more field rules.
    #[error("{0}")]
    Fields(FieldErrors),

    /// One or more elements of a collection failed.
    #[error("{0}")]
    Elements(ElementErrors),

    /// A rule expression could not be evaluated.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl From<validate_rules::Error> for ValidationError {
    fn from(error: validate_rules::Error) -> Self {
        match error {
            validate_rules::Error::Invalid(errors) => Self::Fields(errors),
            validate_rules::Error::Compile(error) => Self::Compile(error),
        }
    }
}

/// Per-element outcomes of a collection, indexed like the collection.
///
/// Slot `i` holds the error of element `i`, or `None` if it passed. Only
/// failed slots are rendered, as `[i]: <message>`, one per line.
#[derive(Debug, Default)]
pub struct ElementErrors(Vec<Option<ValidationError>>);

impl ElementErrors {
    /// Wraps per-element outcomes; `None` if every element passed.
    #[must_use]
    pub fn collect(outcomes: Vec<Option<ValidationError>>) -> Option<Self> {
        outcomes
            .iter()
            .any(Option::is_some)
            .then_some(Self(outcomes))
    }

    /// Number of slots, one per element of the validated collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Error of the element at `index`, if it failed.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ValidationError> {
        self.0.get(index).and_then(Option::as_ref)
    }

    /// Failed elements with their original indices, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ValidationError)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }
}

impl fmt::Display for ElementErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, (i, error)) in self.iter().enumerate() {
            if n > 0 {
                f.write_str("\n")?;
            }
            write!(f, "[{i}]: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ElementErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_error(field: &str) -> ValidationError {
        ValidationError::Compile(CompileError::UnknownRule {
            record: "User".into(),
            field: field.into(),
            rule: "shiny".into(),
        })
    }

    #[test]
    fn all_passing_elements_collapse_to_none() {
        assert!(ElementErrors::collect(vec![None, None, None]).is_none());
        assert!(ElementErrors::collect(Vec::new()).is_none());
    }

    #[test]
    fn rendering_keeps_original_indices() {
        let errors = ElementErrors::collect(vec![None, Some(compile_error("Name")), None]).unwrap();
        let expected = format!("[1]: {}", compile_error("Name"));

        assert_eq!(errors.to_string(), expected);
        assert_eq!(errors.len(), 3);
        assert!(errors.get(0).is_none());
        assert!(errors.get(1).is_some());
    }

    #[test]
    fn multiple_failures_render_one_per_line_ascending() {
        let errors = ElementErrors::collect(vec![
            Some(compile_error("A")),
            None,
            Some(compile_error("C")),
        ])
        .unwrap();

        let rendered = errors.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[0]: "));
        assert!(lines[1].starts_with("[2]: "));
        let indices: Vec<_> = errors.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, [0, 2]);
    }
}
