//! Streaming request validation.
//!
//! [`ValidatedStream`] wraps the receive side of a client or bidirectional
//! stream. Every message is validated as it is pulled; an invalid message is
//! replaced by an `INVALID_ARGUMENT` status and never reaches the handler.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use tokio_stream::{Stream, StreamExt};
use tonic::Status;

use crate::shape::Validatable;
use crate::status::check_request;
use crate::validator::Validator;

/// Inbound message stream validating each message on receive.
///
/// The stream stays usable after a rejected message; later messages are
/// validated and delivered independently.
pub struct ValidatedStream<S> {
    inner: S,
    validator: Arc<Validator>,
}

impl<S> ValidatedStream<S> {
    /// Wrap `inner` using the global validator.
    pub fn new(inner: S) -> Self {
        Self::with_validator(inner, Validator::global())
    }

    pub const fn with_validator(inner: S, validator: Arc<Validator>) -> Self {
        Self { inner, validator }
    }

    pub const fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, T> ValidatedStream<S>
where
    S: Stream<Item = Result<T, Status>> + Unpin,
    T: Validatable,
{
    /// Receive the next valid message, like `tonic::Streaming::message`.
    ///
    /// # Errors
    /// The transport status, or `INVALID_ARGUMENT` for a rejected message.
    pub async fn message(&mut self) -> Result<Option<T>, Status> {
        self.next().await.transpose()
    }
}

impl<S, T> Stream for ValidatedStream<S>
where
    S: Stream<Item = Result<T, Status>> + Unpin,
    T: Validatable,
{
    type Item = Result<T, Status>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = ready!(Pin::new(&mut this.inner).poll_next(cx));

        Poll::Ready(item.map(|received| {
            let message = received?;
            check_request(&this.validator, &message, &[])?;
            Ok(message)
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
