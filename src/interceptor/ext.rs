//! Validation helpers for use inside handlers.

use std::sync::Arc;

use tokio_stream::Stream;
use tonic::{Request, Status};

use crate::interceptor::ValidatedStream;
use crate::shape::Validatable;
use crate::status::check_request;
use crate::validator::Validator;

/// Extension trait for validating requests and converting errors to Status.
pub trait ValidateRequestExt {
    /// Validate with the global validator.
    ///
    /// # Errors
    /// Returns `Status::invalid_argument` with `BadRequest` field violations.
    fn validate_or_status(&self) -> Result<(), Status>;

    /// Validate with the global validator, skipping `fields`.
    ///
    /// # Errors
    /// Returns `Status::invalid_argument` with `BadRequest` field violations.
    fn validate_except_or_status(&self, fields: &[&str]) -> Result<(), Status>;

    /// # Errors
    /// Returns `Status::invalid_argument` with `BadRequest` field violations.
    fn validate_with(&self, validator: &Validator) -> Result<(), Status>;
}

impl<T: Validatable + ?Sized> ValidateRequestExt for T {
    fn validate_or_status(&self) -> Result<(), Status> {
        self.validate_with(&Validator::global())
    }

    fn validate_except_or_status(&self, fields: &[&str]) -> Result<(), Status> {
        check_request(&Validator::global(), self, fields)
    }

    fn validate_with(&self, validator: &Validator) -> Result<(), Status> {
        check_request(validator, self, &[])
    }
}

/// Wrap an inbound message stream so each message is validated on receive.
pub trait ValidateStreamExt: Sized {
    fn validated(self) -> ValidatedStream<Self>;

    fn validated_with(self, validator: Arc<Validator>) -> ValidatedStream<Self>;
}

impl<S, T> ValidateStreamExt for S
where
    S: Stream<Item = Result<T, Status>> + Unpin,
    T: Validatable,
{
    fn validated(self) -> ValidatedStream<Self> {
        ValidatedStream::new(self)
    }

    fn validated_with(self, validator: Arc<Validator>) -> ValidatedStream<Self> {
        ValidatedStream::with_validator(self, validator)
    }
}

/// Streaming request entry point: `request.into_validated_stream()`.
pub trait ValidateStreamingRequestExt<S> {
    fn into_validated_stream(self) -> ValidatedStream<S>;
}

impl<S, T> ValidateStreamingRequestExt<S> for Request<S>
where
    S: Stream<Item = Result<T, Status>> + Unpin,
    T: Validatable,
{
    fn into_validated_stream(self) -> ValidatedStream<S> {
        ValidatedStream::new(self.into_inner())
    }
}
