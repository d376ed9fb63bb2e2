//! Unary request validation middleware.
//!
//! [`ValidationLayer`] wraps services of decoded `tonic::Request<T>` values,
//! not the `http::Request` stack of `Server::builder().layer(..)`. Wrap the
//! handler of a method, then call that service from the generated trait
//! method. Handlers that only need a check can call
//! [`ValidateRequestExt::validate_or_status`](crate::ValidateRequestExt)
//! instead.
//!
//! ```
//! use grpc_validate::{Field, Record, ValidationLayer, validatable};
//! use tonic::{Request, Response, Status};
//! use tower::ServiceBuilder;
//!
//! #[derive(Default)]
//! struct HelloRequest {
//!     name: String,
//! }
//!
//! impl Record for HelloRequest {
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![Field::new("Name", &self.name).rules("required")]
//!     }
//! }
//!
//! validatable!(HelloRequest);
//!
//! async fn say_hello(request: Request<HelloRequest>) -> Result<Response<String>, Status> {
//!     Ok(Response::new(format!("Hello, {}!", request.into_inner().name)))
//! }
//!
//! // Built once, e.g. as a field of the service struct, and driven with
//! // `tower::ServiceExt::oneshot` from the generated `say_hello` method.
//! let _say_hello = ServiceBuilder::new()
//!     .layer(ValidationLayer::default())
//!     .service_fn(say_hello);
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tonic::{Request, Response, Status};
use tower::{Layer, Service};

use crate::shape::Validatable;
use crate::status::check_request;
use crate::validator::Validator;

/// Tower layer validating unary requests before the handler runs.
#[derive(Clone)]
pub struct ValidationLayer {
    validator: Arc<Validator>,
}

impl ValidationLayer {
    #[must_use]
    pub const fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }
}

impl Default for ValidationLayer {
    /// Layer bound to the global validator.
    fn default() -> Self {
        Self::new(Validator::global())
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            validator: Arc::clone(&self.validator),
        }
    }
}

/// Validation middleware service.
///
/// An invalid request is answered with `INVALID_ARGUMENT` and never reaches
/// the inner service. A valid request and the inner response pass through
/// untouched.
#[derive(Clone)]
pub struct ValidationService<S> {
    inner: S,
    validator: Arc<Validator>,
}

impl<S> ValidationService<S> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, Req, Resp> Service<Request<Req>> for ValidationService<S>
where
    S: Service<Request<Req>, Response = Response<Resp>, Error = Status> + Clone + Send + 'static,
    S::Future: Send,
    Req: Validatable + Send + 'static,
    Resp: Send + 'static,
{
    type Response = Response<Resp>;
    type Error = Status;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Req>) -> Self::Future {
        if let Err(status) = check_request(&self.validator, req.get_ref(), &[]) {
            return Box::pin(async move { Err(status) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tonic::Code;
    use tower::{ServiceExt, service_fn};
    use validate_rules::{Field, Record};

    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Greet {
        name: String,
    }

    impl Record for Greet {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::new("Name", &self.name).rules("required")]
        }
    }

    crate::validatable!(Greet);

    macro_rules! greeter {
        ($calls:expr) => {{
            let calls = Arc::clone(&$calls);
            service_fn(move |req: Request<Greet>| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Status>(Response::new(format!("hello {}", req.into_inner().name)))
                }
            })
        }};
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = ValidationLayer::new(Arc::new(Validator::new())).layer(greeter!(calls));

        let status = service
            .oneshot(Request::new(Greet::default()))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_request_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = ValidationLayer::default().layer(greeter!(calls));

        let response = service
            .oneshot(Request::new(Greet { name: "ok".into() }))
            .await
            .unwrap();

        assert_eq!(response.into_inner(), "hello ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
