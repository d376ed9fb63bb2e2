//! Translation of validation failures into gRPC statuses.
//!
//! Every failure becomes `INVALID_ARGUMENT` with the error text as message
//! and a `google.rpc.BadRequest` detail listing each field violation.

use tonic::{Code, Status};
use tonic_types::{ErrorDetails, FieldViolation, StatusExt};
use tracing::{debug, error};

use crate::error::ValidationError;
use crate::shape::{Shape, Validatable};
use crate::validator::Validator;

/// Message of the status returned for an absent request.
pub const MISSING_REQUEST_MESSAGE: &str = "a request value is required";

/// Status for a request that carries no value at all.
#[must_use]
pub fn missing_request() -> Status {
    Status::invalid_argument(MISSING_REQUEST_MESSAGE)
}

impl From<ValidationError> for Status {
    fn from(error: ValidationError) -> Self {
        let mut violations = Vec::new();
        collect_violations(&error, &mut violations);
        invalid_argument(error.to_string(), violations)
    }
}

/// Field violations carried by `error`, in reporting order.
#[must_use]
pub fn field_violations(error: &ValidationError) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    collect_violations(error, &mut violations);
    violations
}

fn collect_violations(error: &ValidationError, out: &mut Vec<FieldViolation>) {
    match error {
        ValidationError::Fields(errors) => {
            out.extend(errors.iter().map(|e| FieldViolation {
                field: e.field().to_string(),
                description: e.to_string(),
                ..Default::default()
            }));
        }
        ValidationError::Elements(elements) => {
            for (_, element) in elements.iter() {
                collect_violations(element, out);
            }
        }
        ValidationError::Compile(_) => {}
    }
}

/// Build the `INVALID_ARGUMENT` status with a `BadRequest` detail.
///
/// # Panics
/// Panics if the detail cannot be attached to the status. That is a defect
/// in detail construction, never a property of the request.
fn invalid_argument(message: String, violations: Vec<FieldViolation>) -> Status {
    let expected = violations.len();
    let status = Status::with_error_details(
        Code::InvalidArgument,
        message,
        ErrorDetails::with_bad_request(violations),
    );

    match status.get_details_bad_request() {
        Some(detail) if detail.field_violations.len() == expected => status,
        attached => {
            let attached = attached.map(|d| d.field_violations.len());
            error!(expected, ?attached, "Failed to attach bad request details");
            panic!(
                "unexpected error attaching bad request details: \
                 expected {expected} violations, got {attached:?}"
            );
        }
    }
}

/// Number of field violations attached to a validation status.
fn violation_count(status: &Status) -> usize {
    status
        .get_details_bad_request()
        .map_or(0, |detail| detail.field_violations.len())
}

/// Check a request or stream message, producing the status to abort with.
///
/// An absent value fails with [`MISSING_REQUEST_MESSAGE`] without consulting
/// the rule engine.
///
/// # Errors
/// `INVALID_ARGUMENT` for an absent or invalid request.
pub fn check_request<V: Validatable + ?Sized>(
    validator: &Validator,
    request: &V,
    except: &[&str],
) -> Result<(), Status> {
    let shape = request.shape();
    if matches!(shape, Shape::Nil) {
        if validator.logs_violations() {
            debug!(
                request = std::any::type_name::<V>(),
                violations = 0,
                "Rejected absent request"
            );
        }
        return Err(missing_request());
    }

    validator.validate_shape(shape, except).map_err(|err| {
        let status = Status::from(err);
        if validator.logs_violations() {
            debug!(
                request = std::any::type_name::<V>(),
                violations = violation_count(&status),
                message = status.message(),
                "Rejected invalid request"
            );
        }
        status
    })
}
