//! Request validation middleware for tonic gRPC services.
//!
//! Declare rules on request records, then validate them at the service
//! boundary:
//! - [`ValidationLayer`] rejects invalid unary requests before the handler
//! - [`ValidatedStream`] rejects invalid messages on inbound streams
//! - [`ValidateRequestExt`] validates manually inside a handler
//!
//! Failures become `INVALID_ARGUMENT` with a `google.rpc.BadRequest` detail
//! listing every field violation.
//!
//! ```
//! use grpc_validate::{Field, Record, Validator, validatable};
//!
//! #[derive(Default)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! impl Record for CreateUser {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::new("Name", &self.name).rules("required,max=64"),
//!             Field::new("Email", &self.email).rules("required,email"),
//!         ]
//!     }
//! }
//!
//! validatable!(CreateUser);
//!
//! let validator = Validator::new();
//! assert!(validator.validate(&CreateUser::default()).is_err());
//! ```

pub mod config;
pub mod error;
pub mod interceptor;
pub mod shape;
pub mod status;
pub mod validator;

pub use config::{ConfigError, ValidationConfig};
pub use error::{ElementErrors, ValidationError};
pub use interceptor::{
    ValidateRequestExt, ValidateStreamExt, ValidateStreamingRequestExt, ValidatedStream,
    ValidationLayer, ValidationService,
};
pub use shape::{Shape, Validatable};
pub use status::{MISSING_REQUEST_MESSAGE, check_request, field_violations, missing_request};
pub use validate_rules::{
    CompileError, Field, FieldError, FieldErrors, FieldValue, Record, RuleEngine, RuleFn, RuleSet,
};
pub use validator::{TypeRuleSet, Validator};
