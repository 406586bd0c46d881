//! Message dispatch.
//!
//! [`Dispatcher::execute_command`] takes one normalized message through three
//! stages and reports whether anything handled it:
//!
//! ```text
//!  ┌──────────────┐ command-shaped ┌──────────────────┐
//!  │ button id?   │───────────────▶│ command handler  │──▶ true
//!  └──────┬───────┘                └──────────────────┘
//!         │ none / unrecognized
//!  ┌──────▼───────┐ pattern match  ┌──────────────────┐
//!  │ body prefix? │───────────────▶│ command handler  │──▶ true
//!  └──────┬───────┘                └──────────────────┘
//!         │ no prefix / no match
//!  ┌──────▼───────┐                ┌──────────────────┐
//!  │ event path   │───────────────▶│ reply │ type+any │──▶ any handler ran?
//!  └──────────────┘                └──────────────────┘
//! ```
//!
//! At most one command handler runs per message. A command-shaped message
//! that fails the permission check gets a denial reply and counts as handled,
//! so it never reaches the event handlers.
//!
//! Each dispatch works against one registry snapshot taken when it starts.
//! Handler failures are contained by [`FeedbackLayer`]; the caller only ever
//! sees a boolean.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::ServiceExt;
use tower_layer::Layer;
use tracing::{Instrument, debug, info, info_span, trace, warn};

use chime_core::{BoxedTransport, EventType, NormalizedMessage};

use crate::context::{CommandContext, EventContext, Session};
use crate::feedback::{Feedback, FeedbackLayer, HandlerKind, RunOutcome};
use crate::handler::{HandlerService, Invocation};
use crate::matcher::{ButtonResolution, CommandInput, find_command, resolve_button};
use crate::permission::PermissionPolicy;
use crate::registry::{CommandHandler, EventHandler, Registry, SharedRegistry};

/// The command prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = ".";

/// Reply sent when a sender may not run a command.
pub const PERMISSION_DENIED: &str = "You are not allowed to use this command.";

/// Routes messages to registered handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: SharedRegistry,
    transport: BoxedTransport,
    prefix: String,
    policy: PermissionPolicy,
    started_at: Instant,
}

impl Dispatcher {
    /// Creates a dispatcher with the default prefix and an empty privileged
    /// user list.
    pub fn new(registry: SharedRegistry, transport: BoxedTransport) -> Self {
        Self {
            registry,
            transport,
            prefix: DEFAULT_PREFIX.to_string(),
            policy: PermissionPolicy::default(),
            started_at: Instant::now(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_policy(mut self, policy: PermissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    /// Time since the dispatcher was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Dispatches one message. Returns `true` if it was handled.
    pub async fn execute_command(&self, message: Arc<NormalizedMessage>) -> bool {
        let span = info_span!("dispatch", id = %message.key.id, chat = %message.chat());
        self.dispatch(message).instrument(span).await
    }

    async fn dispatch(&self, message: Arc<NormalizedMessage>) -> bool {
        let registry = self.registry.snapshot();
        let session = Session::new(self.transport.clone(), registry.clone(), self.uptime());

        if let Some(resolution) = resolve_button(&message, &self.prefix) {
            match resolution {
                ButtonResolution::Command { id, input } => {
                    match find_command(&registry, &input) {
                        Some(cmd) => return self.run_command(cmd, input, message, session).await,
                        None => {
                            debug!(button = %id, "No handler for button command");
                            let notice = format!("No handler found for button command: {id}");
                            self.reply(&message, &notice).await;
                            return true;
                        }
                    }
                }
                ButtonResolution::Canned(canned) => {
                    self.reply(&message, &canned.reply(self.uptime())).await;
                    return true;
                }
                ButtonResolution::Unrecognized(id) => {
                    trace!(button = %id, "Unrecognized button id");
                }
            }
        }

        if let Some(input) = CommandInput::from_prefixed(message.text(), &self.prefix) {
            if let Some(cmd) = find_command(&registry, &input) {
                return self.run_command(cmd, input, message, session).await;
            }
            trace!(command = %input.command, "No command matched");
        }

        self.handle_event(&registry, message, session).await
    }

    async fn run_command(
        &self,
        cmd: &CommandHandler,
        input: CommandInput,
        message: Arc<NormalizedMessage>,
        session: Session,
    ) -> bool {
        if !self.policy.can_invoke(&message, cmd.public) {
            info!(command = %input.command, sender = %message.sender(), "Permission denied");
            self.reply(&message, PERMISSION_DENIED).await;
            return true;
        }

        debug!(command = %input.command, pattern = %cmd.pattern, "Running command");
        let context = CommandContext::new(input, self.prefix.clone(), session);
        let feedback = Feedback::new(self.transport.clone(), HandlerKind::Command, cmd.react);
        run_with_feedback(cmd.service(), feedback, Invocation::new(message, context)).await;
        true
    }

    async fn handle_event(
        &self,
        registry: &Registry,
        message: Arc<NormalizedMessage>,
        session: Session,
    ) -> bool {
        if message.is_reply_to_bot() && registry.has_event_handlers(EventType::ReplyToBot) {
            let handlers = registry.event_handlers(EventType::ReplyToBot);
            self.run_event_handlers(handlers, EventType::ReplyToBot, &message, &session)
                .await;
            return true;
        }

        let event_type = message.message.classify();
        trace!(event_type = %event_type, "Classified message");

        let typed = registry.event_handlers(event_type);
        let any = registry.event_handlers(EventType::Any);

        let ran_typed = self
            .run_event_handlers(typed, event_type, &message, &session)
            .await;
        let ran_any = self
            .run_event_handlers(any, event_type, &message, &session)
            .await;
        ran_typed || ran_any
    }

    /// Runs `handlers` in order. Returns `true` if at least one was allowed
    /// to run.
    async fn run_event_handlers(
        &self,
        handlers: &[EventHandler],
        event_type: EventType,
        message: &Arc<NormalizedMessage>,
        session: &Session,
    ) -> bool {
        let mut ran = false;
        for handler in handlers {
            if !self.policy.can_invoke(message, handler.public) {
                trace!(handler = %handler.desc, "Event handler skipped: not permitted");
                continue;
            }

            let context = EventContext::new(event_type, session.clone());
            let kind = HandlerKind::Event(handler.event_type);
            let feedback = Feedback::new(self.transport.clone(), kind, handler.react);
            run_with_feedback(
                handler.service(),
                feedback,
                Invocation::new(message.clone(), context),
            )
            .await;
            ran = true;
        }
        ran
    }

    async fn reply(&self, message: &NormalizedMessage, text: &str) {
        if let Err(e) = self.transport.reply(message, text).await {
            warn!(error = %e, "Failed to send reply");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefix", &self.prefix)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Runs one handler under a [`FeedbackLayer`] inside a `handler` span.
///
/// The returned future is boxed so that dispatch futures stay `Send` while
/// they borrow registry entries across the await.
fn run_with_feedback<C>(
    service: HandlerService<C>,
    feedback: Feedback,
    invocation: Invocation<C>,
) -> BoxFuture<'static, RunOutcome>
where
    C: Send + 'static,
{
    let span = info_span!("handler", kind = ?feedback.kind());
    FeedbackLayer::new(feedback)
        .layer(service)
        .oneshot(invocation)
        .map(|result| match result {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        })
        .instrument(span)
        .boxed()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::pattern::Pattern;
    use crate::registry::{CommandOptions, EventOptions};
    use crate::testing::{
        BOT, RecordingTransport, STRANGER, button_from, content_from_stranger, text_from,
    };
    use chime_core::{MessageContent, MessageKey, QuotedMessage};

    const OWNER: &str = "100@s.whatsapp.net";

    fn setup(build: impl FnOnce(&mut Registry)) -> (Dispatcher, Arc<RecordingTransport>) {
        let mut registry = Registry::new();
        build(&mut registry);
        let transport = RecordingTransport::new();
        let dispatcher = Dispatcher::new(SharedRegistry::new(registry), transport.boxed())
            .with_policy(PermissionPolicy::new(Some("100"), ["200"]));
        (dispatcher, transport)
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn count_command(registry: &mut Registry, options: CommandOptions, hits: &Arc<AtomicUsize>) {
        let hits = hits.clone();
        registry.command(options, move |_msg, _ctx| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    fn count_event(registry: &mut Registry, options: EventOptions, hits: &Arc<AtomicUsize>) {
        let hits = hits.clone();
        registry.on(options, move |_msg, _ctx| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    #[tokio::test]
    async fn test_prefixed_command_receives_parsed_input() {
        let seen = Arc::new(Mutex::new(None));
        let hits = counter();
        let (dispatcher, _) = setup(|r| {
            let seen = seen.clone();
            let hits = hits.clone();
            r.command(CommandOptions::new("ping"), move |_msg, ctx| {
                let seen = seen.clone();
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    *seen.lock() = Some((ctx.command, ctx.text, ctx.args, ctx.prefix));
                }
            });
        });

        let handled = dispatcher
            .execute_command(Arc::new(text_from(STRANGER, ".PING extra args")))
            .await;

        assert!(handled);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let (command, text, args, prefix) = seen.lock().clone().unwrap();
        assert_eq!(command, "ping");
        assert_eq!(text, "extra args");
        assert_eq!(args, ["extra", "args"]);
        assert_eq!(prefix, ".");
    }

    #[tokio::test]
    async fn test_reregistration_runs_newest_only() {
        let old = counter();
        let new = counter();
        let (dispatcher, _) = setup(|r| {
            count_command(r, CommandOptions::new("ping"), &old);
            count_command(r, CommandOptions::new("ping"), &new);
        });

        assert!(dispatcher.execute_command(Arc::new(text_from(STRANGER, ".ping"))).await);
        assert_eq!(old.load(Ordering::SeqCst), 0);
        assert_eq!(new.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reregistration_ignores_literal_case() {
        let old = counter();
        let new = counter();
        let (dispatcher, _) = setup(|r| {
            count_command(r, CommandOptions::new("Ping"), &old);
            count_command(r, CommandOptions::new("ping"), &new);
        });

        assert_eq!(dispatcher.registry().snapshot().command_count(), 1);
        assert!(dispatcher.execute_command(Arc::new(text_from(STRANGER, ".PING"))).await);
        assert_eq!(old.load(Ordering::SeqCst), 0);
        assert_eq!(new.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_public_command_denied_for_stranger() {
        let hits = counter();
        let events = counter();
        let (dispatcher, transport) = setup(|r| {
            count_command(r, CommandOptions::new("restart").public(false).react(true), &hits);
            count_event(r, EventOptions::new(EventType::Text), &events);
        });

        let handled = dispatcher
            .execute_command(Arc::new(text_from(STRANGER, ".restart")))
            .await;

        assert!(handled);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(events.load(Ordering::SeqCst), 0);
        assert_eq!(transport.texts(), [PERMISSION_DENIED]);
        assert!(transport.reactions().is_empty());
    }

    #[tokio::test]
    async fn test_non_public_command_allowed_for_owner_and_self() {
        let hits = counter();
        let (dispatcher, transport) = setup(|r| {
            count_command(r, CommandOptions::new("restart").public(false), &hits);
        });

        assert!(dispatcher.execute_command(Arc::new(text_from(OWNER, ".restart"))).await);
        assert!(dispatcher.execute_command(Arc::new(text_from(BOT, ".restart"))).await);

        let mut own = text_from(STRANGER, ".restart");
        own.key.from_me = true;
        assert!(dispatcher.execute_command(Arc::new(own)).await);

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(transport.texts().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_button_delivery_runs_once() {
        let hits = counter();
        let (dispatcher, _) = setup(|r| count_command(r, CommandOptions::new("menu"), &hits));

        let message = Arc::new(button_from(STRANGER, ".menu"));
        assert!(dispatcher.execute_command(message.clone()).await);
        assert!(!dispatcher.execute_command(message.clone()).await);

        let redelivered = Arc::new(NormalizedMessage::clone(&message));
        assert!(!dispatcher.execute_command(redelivered).await);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_button_without_handler_sends_notice() {
        let (dispatcher, transport) = setup(|_| {});

        let handled = dispatcher
            .execute_command(Arc::new(button_from(STRANGER, ".nothing here")))
            .await;

        assert!(handled);
        assert_eq!(
            transport.texts(),
            ["No handler found for button command: .nothing here"]
        );
    }

    #[tokio::test]
    async fn test_alive_button_gets_canned_reply() {
        let (dispatcher, transport) = setup(|_| {});

        assert!(dispatcher.execute_command(Arc::new(button_from(STRANGER, "alive"))).await);

        let texts = transport.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Status: Online"));
    }

    #[tokio::test]
    async fn test_unrecognized_button_falls_through_to_body() {
        let hits = counter();
        let (dispatcher, _) = setup(|r| count_command(r, CommandOptions::new("ping"), &hits));

        let message = button_from(STRANGER, "yes").with_body(".ping");
        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_command_replies_once() {
        let (dispatcher, transport) = setup(|r| {
            r.command(CommandOptions::new("fail").react(true), |_msg, _ctx| async {
                Err::<(), _>("backend unavailable")
            });
        });

        let handled = dispatcher.execute_command(Arc::new(text_from(STRANGER, ".fail"))).await;

        assert!(handled);
        assert_eq!(
            transport.texts(),
            ["Error executing command: backend unavailable"]
        );
        assert_eq!(transport.reactions(), ["⏳", "❌"]);
    }

    #[tokio::test]
    async fn test_video_without_type_handler_runs_any() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (dispatcher, _) = setup(|r| {
            let seen = seen.clone();
            r.on(EventOptions::new(EventType::Any), move |_msg, ctx| {
                let seen = seen.clone();
                async move { seen.lock().push(ctx.event_type) }
            });
        });

        let message = content_from_stranger(MessageContent {
            video_message: Some(json!({ "seconds": 4 })),
            ..Default::default()
        });

        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(*seen.lock(), [EventType::Video]);
    }

    #[tokio::test]
    async fn test_plain_text_without_handlers_is_unhandled() {
        let (dispatcher, transport) = setup(|r| {
            count_event(r, EventOptions::new(EventType::Image), &counter());
        });

        assert!(!dispatcher.execute_command(Arc::new(text_from(STRANGER, "hello"))).await);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_command_falls_through_to_text() {
        let text = counter();
        let (dispatcher, _) = setup(|r| {
            count_command(r, CommandOptions::new("ping"), &counter());
            count_event(r, EventOptions::new(EventType::Text), &text);
        });

        assert!(dispatcher.execute_command(Arc::new(text_from(STRANGER, ".pong"))).await);
        assert_eq!(text.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reply_to_bot_short_circuits() {
        let reply = counter();
        let text = counter();
        let any = counter();
        let (dispatcher, _) = setup(|r| {
            count_event(r, EventOptions::new(EventType::ReplyToBot), &reply);
            count_event(r, EventOptions::new(EventType::Text), &text);
            count_event(r, EventOptions::new(EventType::Any), &any);
        });

        let message = text_from(STRANGER, "thanks").with_quoted(QuotedMessage {
            sender: BOT.to_string(),
            ..Default::default()
        });

        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(reply.load(Ordering::SeqCst), 1);
        assert_eq!(text.load(Ordering::SeqCst), 0);
        assert_eq!(any.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reply_to_bot_without_reply_handlers_is_classified() {
        let text = counter();
        let (dispatcher, _) = setup(|r| count_event(r, EventOptions::new(EventType::Text), &text));

        let message = text_from(STRANGER, "thanks").with_quoted(QuotedMessage {
            sender: BOT.to_string(),
            ..Default::default()
        });

        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(text.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_event_handler_does_not_count() {
        let hits = counter();
        let (dispatcher, transport) = setup(|r| {
            count_event(r, EventOptions::new(EventType::Text).public(false), &hits);
        });

        assert!(!dispatcher.execute_command(Arc::new(text_from(STRANGER, "hi"))).await);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(transport.sent().is_empty());

        assert!(dispatcher.execute_command(Arc::new(text_from(OWNER, "hi"))).await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_event_handler_does_not_stop_the_next() {
        let after = counter();
        let (dispatcher, transport) = setup(|r| {
            r.on(EventOptions::new(EventType::Sticker), |_msg, _ctx| async {
                Err::<(), _>("cannot decode")
            });
            count_event(r, EventOptions::new(EventType::Sticker), &after);
            count_event(r, EventOptions::new(EventType::Any), &after);
        });

        let message = content_from_stranger(MessageContent {
            sticker_message: Some(json!({})),
            ..Default::default()
        });

        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(after.load(Ordering::SeqCst), 2);
        assert_eq!(transport.texts(), ["Error in sticker handler: cannot decode"]);
    }

    #[tokio::test]
    async fn test_snapshot_taken_per_dispatch() {
        let hits = counter();
        let (dispatcher, _) = setup(|_| {});

        assert!(!dispatcher.execute_command(Arc::new(text_from(STRANGER, ".ping"))).await);

        dispatcher
            .registry()
            .update(|r| count_command(r, CommandOptions::new(Pattern::regex("^p").unwrap()), &hits));

        assert!(dispatcher.execute_command(Arc::new(text_from(STRANGER, ".ping"))).await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let hits = counter();
        let (dispatcher, _) = setup(|r| count_command(r, CommandOptions::new("ping"), &hits));
        let dispatcher = dispatcher.with_prefix("!");

        assert!(!dispatcher.execute_command(Arc::new(text_from(STRANGER, ".ping"))).await);
        assert!(dispatcher.execute_command(Arc::new(text_from(STRANGER, "!ping"))).await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn test_dispatch_future_is_send() {
        fn dispatch(dispatcher: &'static Dispatcher, message: Arc<NormalizedMessage>) {
            assert_send(dispatcher.execute_command(message));
        }
        let _ = dispatch;
    }

    #[tokio::test]
    async fn test_dispatch_runs_on_spawned_task() {
        let command = counter();
        let text = counter();
        let (dispatcher, _) = setup(|r| {
            count_command(r, CommandOptions::new("ping"), &command);
            count_event(r, EventOptions::new(EventType::Text), &text);
        });
        let dispatcher = Arc::new(dispatcher);

        for body in [".ping", "hello"] {
            let dispatcher = dispatcher.clone();
            let message = Arc::new(text_from(STRANGER, body));
            let handled = tokio::spawn(async move { dispatcher.execute_command(message).await })
                .await
                .unwrap();
            assert!(handled);
        }

        assert_eq!(command.load(Ordering::SeqCst), 1);
        assert_eq!(text.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_button_command_denied_for_stranger() {
        let hits = counter();
        let (dispatcher, transport) = setup(|r| {
            count_command(r, CommandOptions::new("restart").public(false), &hits);
        });

        assert!(dispatcher.execute_command(Arc::new(button_from(STRANGER, ".restart"))).await);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(transport.texts(), [PERMISSION_DENIED]);
        assert!(transport.reactions().is_empty());

        assert!(dispatcher.execute_command(Arc::new(button_from(OWNER, ".restart"))).await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_button_command_replies_once() {
        let (dispatcher, transport) = setup(|r| {
            r.command(CommandOptions::new("deploy").react(true), |_msg, _ctx| async {
                Err::<(), _>("no target")
            });
        });

        assert!(dispatcher.execute_command(Arc::new(button_from(STRANGER, ".deploy"))).await);
        assert_eq!(transport.texts(), ["Error executing command: no target"]);
        assert_eq!(transport.reactions(), ["⏳", "❌"]);
    }

    #[tokio::test]
    async fn test_failing_reply_handler_is_reported() {
        let text = counter();
        let (dispatcher, transport) = setup(|r| {
            r.on(EventOptions::new(EventType::ReplyToBot), |_msg, _ctx| async {
                Err::<(), _>("lost thread")
            });
            count_event(r, EventOptions::new(EventType::Text), &text);
        });

        let message = text_from(STRANGER, "thanks").with_quoted(QuotedMessage {
            sender: BOT.to_string(),
            ..Default::default()
        });

        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(transport.texts(), ["Error in reply handler: lost thread"]);
        assert_eq!(text.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_denied_reply_handler_still_short_circuits() {
        let reply = counter();
        let text = counter();
        let (dispatcher, transport) = setup(|r| {
            count_event(r, EventOptions::new(EventType::ReplyToBot).public(false), &reply);
            count_event(r, EventOptions::new(EventType::Text), &text);
        });

        let message = text_from(STRANGER, "thanks").with_quoted(QuotedMessage {
            sender: BOT.to_string(),
            ..Default::default()
        });

        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(reply.load(Ordering::SeqCst), 0);
        assert_eq!(text.load(Ordering::SeqCst), 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_reply_to_bot_matches_device_qualified_account() {
        let reply = counter();
        let (dispatcher, _) = setup(|r| {
            count_event(r, EventOptions::new(EventType::ReplyToBot), &reply);
        });

        let key = MessageKey::new("MSG4", STRANGER);
        let message = NormalizedMessage::new(key, "999:4@s.whatsapp.net")
            .with_sender(STRANGER)
            .with_body("thanks")
            .with_quoted(QuotedMessage {
                sender: BOT.to_string(),
                ..Default::default()
            });

        assert!(dispatcher.execute_command(Arc::new(message)).await);
        assert_eq!(reply.load(Ordering::SeqCst), 1);
    }
}
