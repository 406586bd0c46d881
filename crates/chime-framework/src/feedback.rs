//! Reaction feedback and error isolation around handler runs.
//!
//! Every handler run goes through three explicit steps:
//!
//! | Step | `react = true` | always |
//! |------|----------------|--------|
//! | [`Feedback::before`] | ⏳ reaction | |
//! | [`Feedback::after_success`] | ✅ reaction | |
//! | [`Feedback::after_failure`] | ❌ reaction | error reply |
//!
//! [`FeedbackLayer`] stacks these steps on a [`HandlerService`] so the
//! dispatcher never sees a handler error or panic: the wrapped service always
//! resolves to a [`RunOutcome`].
//!
//! [`HandlerService`]: crate::handler::HandlerService

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use tower::{BoxError, Service, ServiceExt};
use tower_layer::Layer;
use tracing::{error, warn};

use chime_core::{BoxedTransport, EventType, NormalizedMessage};

use crate::error::{HandlerPanicked, panic_message};
use crate::handler::Invocation;

/// Reactions sent around a handler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Working,
    Done,
    Failed,
}

impl Reaction {
    pub fn emoji(self) -> &'static str {
        match self {
            Reaction::Working => "⏳",
            Reaction::Done => "✅",
            Reaction::Failed => "❌",
        }
    }
}

/// What kind of handler is running. Decides the wording of error replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Command,
    Event(EventType),
}

/// How a handler run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// The handler failed; the user was told.
    Failed,
}

// ============================================================================
// Feedback
// ============================================================================

/// The pre/post steps of one handler run.
#[derive(Clone)]
pub struct Feedback {
    transport: BoxedTransport,
    kind: HandlerKind,
    react: bool,
}

impl Feedback {
    pub fn new(transport: BoxedTransport, kind: HandlerKind, react: bool) -> Self {
        Self {
            transport,
            kind,
            react,
        }
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Sent before the callback runs.
    pub async fn before(&self, message: &NormalizedMessage) {
        if self.react {
            self.send_reaction(message, Reaction::Working).await;
        }
    }

    /// Sent after the callback returned successfully.
    pub async fn after_success(&self, message: &NormalizedMessage) {
        if self.react {
            self.send_reaction(message, Reaction::Done).await;
        }
    }

    /// Sent after the callback failed.
    pub async fn after_failure(&self, message: &NormalizedMessage, err: &BoxError) {
        let text = self.error_text(err);
        if let Err(e) = self.transport.reply(message, &text).await {
            warn!(error = %e, "Failed to send error reply");
        }
        if self.react {
            self.send_reaction(message, Reaction::Failed).await;
        }
    }

    /// The reply text for a handler error.
    pub fn error_text(&self, err: &BoxError) -> String {
        match self.kind {
            HandlerKind::Command => format!("Error executing command: {err}"),
            HandlerKind::Event(event_type) => format!("Error in {event_type} handler: {err}"),
        }
    }

    async fn send_reaction(&self, message: &NormalizedMessage, reaction: Reaction) {
        if let Err(e) = self.transport.react_to(message, reaction.emoji()).await {
            warn!(error = %e, reaction = ?reaction, "Failed to send reaction");
        }
    }
}

impl fmt::Debug for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feedback")
            .field("kind", &self.kind)
            .field("react", &self.react)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// FeedbackLayer / FeedbackService
// ============================================================================

/// Wraps a handler service with [`Feedback`] steps.
#[derive(Clone, Debug)]
pub struct FeedbackLayer {
    feedback: Feedback,
}

impl FeedbackLayer {
    pub fn new(feedback: Feedback) -> Self {
        Self { feedback }
    }
}

impl<S> Layer<S> for FeedbackLayer {
    type Service = FeedbackService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FeedbackService {
            inner,
            feedback: self.feedback.clone(),
        }
    }
}

/// A handler service that reports errors to the user instead of returning
/// them.
#[derive(Clone, Debug)]
pub struct FeedbackService<S> {
    inner: S,
    feedback: Feedback,
}

impl<S, C> Service<Invocation<C>> for FeedbackService<S>
where
    S: Service<Invocation<C>, Response = (), Error = BoxError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    C: Send + 'static,
{
    type Response = RunOutcome;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<RunOutcome, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, invocation: Invocation<C>) -> Self::Future {
        let inner = self.inner.clone();
        let feedback = self.feedback.clone();

        Box::pin(async move {
            let message = invocation.message.clone();
            feedback.before(&message).await;

            let result = AssertUnwindSafe(inner.oneshot(invocation))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    Err(Box::new(HandlerPanicked(panic_message(payload.as_ref()))) as BoxError)
                });

            match result {
                Ok(()) => {
                    feedback.after_success(&message).await;
                    Ok(RunOutcome::Completed)
                }
                Err(err) => {
                    error!(kind = ?feedback.kind, error = %err, "Handler failed");
                    feedback.after_failure(&message, &err).await;
                    Ok(RunOutcome::Failed)
                }
            }
        })
    }
}
