//! gRPC request validation middleware.
//!
//! Two interception points share one validation path:
//! - [`ValidationLayer`] wraps a unary handler as a tower layer and rejects
//!   invalid requests before the handler runs.
//! - [`ValidatedStream`] wraps an inbound message stream and rejects invalid
//!   messages as they are received.
//!
//! Both translate failures into `INVALID_ARGUMENT` with `BadRequest` details.
//!
//! # Layer Order
//! Place the validation layer inside authentication and tracing layers, so
//! unauthenticated calls are refused before their payload is inspected.

pub mod ext;
pub mod stream;
pub mod unary;

pub use ext::{ValidateRequestExt, ValidateStreamExt, ValidateStreamingRequestExt};
pub use stream::ValidatedStream;
pub use unary::{ValidationLayer, ValidationService};
