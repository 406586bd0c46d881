//! Handler callbacks as tower services.
//!
//! Plugins register plain async closures. Internally each closure is wrapped
//! into a [`HandlerService`]: a boxed, cloneable `tower::Service` that takes an
//! [`Invocation`] and resolves to `Result<(), BoxError>`. Cross-cutting
//! behaviour (reaction feedback, error replies) is layered on top by
//! [`FeedbackLayer`](crate::feedback::FeedbackLayer).
//!
//! A callback may return `()` or any `Result<(), E>` where `E` converts into
//! [`BoxError`]:
//!
//! ```rust,ignore
//! registry.command(CommandOptions::new("echo"), |msg, ctx| async move {
//!     ctx.reply(&msg, &ctx.text).await?;
//!     Ok::<_, BoxError>(())
//! });
//!
//! registry.on(EventOptions::new(EventType::Image), |_msg, _ctx| async move {
//!     tracing::info!("image received");
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tower::BoxError;
use tower::util::{BoxCloneSyncService, service_fn};

use chime_core::NormalizedMessage;

/// One call of a handler: the message and the handler-specific context.
#[derive(Debug, Clone)]
pub struct Invocation<C> {
    pub message: Arc<NormalizedMessage>,
    pub context: C,
}

impl<C> Invocation<C> {
    pub fn new(message: Arc<NormalizedMessage>, context: C) -> Self {
        Self { message, context }
    }
}

/// A type-erased handler service.
pub type HandlerService<C> = BoxCloneSyncService<Invocation<C>, (), BoxError>;

// ============================================================================
// HandlerResult
// ============================================================================

/// Return types accepted from handler callbacks.
pub trait HandlerResult: Send + 'static {
    /// Converts the return value into the service result.
    fn into_result(self) -> Result<(), BoxError>;
}

impl HandlerResult for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> HandlerResult for Result<(), E>
where
    E: Into<BoxError> + Send + 'static,
{
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Wraps an async callback into a [`HandlerService`].
pub fn into_service<C, F, Fut, R>(callback: F) -> HandlerService<C>
where
    C: Send + 'static,
    F: Fn(Arc<NormalizedMessage>, C) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerResult,
{
    BoxCloneSyncService::new(service_fn(move |invocation: Invocation<C>| {
        callback(invocation.message, invocation.context).map(HandlerResult::into_result)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn message() -> Arc<NormalizedMessage> {
        Arc::new(NormalizedMessage::default())
    }

    #[tokio::test]
    async fn test_unit_callback_is_ok() {
        let svc: HandlerService<()> = into_service(|_msg, _ctx: ()| async {});
        let result = svc.oneshot(Invocation::new(message(), ())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_error_callback_is_propagated() {
        let svc: HandlerService<u8> = into_service(|_msg, n: u8| async move {
            if n > 1 {
                Err(format!("too big: {n}"))
            } else {
                Ok(())
            }
        });

        let ok = svc.clone().oneshot(Invocation::new(message(), 1)).await;
        assert!(ok.is_ok());

        let err = svc.oneshot(Invocation::new(message(), 2)).await.unwrap_err();
        assert_eq!(err.to_string(), "too big: 2");
    }
}
