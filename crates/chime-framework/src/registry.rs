//! The handler registry.
//!
//! A [`Registry`] owns two tables:
//!
//! - **commands**: an insertion-ordered list of [`CommandHandler`]s keyed by
//!   [`Pattern`]. Registering an identical pattern again replaces the earlier
//!   handler in place, so matching order is stable across re-registration.
//! - **events**: for each [`EventType`], an insertion-ordered list of
//!   [`EventHandler`]s. Registration is additive; every handler for a type runs.
//!
//! Registration goes through one entry point, [`Registry::register`], which
//! accepts either descriptor kind:
//!
//! ```rust,ignore
//! let mut registry = Registry::new();
//!
//! registry.register(
//!     CommandOptions::new("ping").desc("Check latency").category("info"),
//!     |msg, ctx| async move { ctx.reply(&msg, "pong").await },
//! );
//!
//! registry.register(EventOptions::new(EventType::Sticker), |_msg, _ctx| async {});
//! ```
//!
//! Descriptor fields left unset take their defaults; registration never fails.
//!
//! The registry itself is a plain value. The runtime shares it through a
//! [`SharedRegistry`], which hands out immutable snapshots to dispatch and
//! swaps in a freshly built registry on every plugin load pass.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

use chime_core::{EventType, NormalizedMessage};

use crate::context::{CommandContext, EventContext};
use crate::handler::{HandlerResult, HandlerService, into_service};
use crate::pattern::Pattern;

const DEFAULT_DESC: &str = "No description provided";
const DEFAULT_CATEGORY: &str = "misc";

// =============================================================================
// Descriptors
// =============================================================================

/// A registration descriptor: decides which table a callback lands in and
/// which context type it receives.
pub trait Descriptor {
    /// Context passed to the callback alongside the message.
    type Context: Send + 'static;

    /// Inserts the handler described by `self` into `registry`.
    fn install(self, registry: &mut Registry, service: HandlerService<Self::Context>);
}

/// Descriptor of a command handler.
#[derive(Debug, Clone)]
pub struct CommandOptions {
    pattern: Pattern,
    desc: Option<String>,
    usage: Option<String>,
    category: Option<String>,
    react: bool,
    public: bool,
}

impl CommandOptions {
    pub fn new(pattern: impl Into<Pattern>) -> Self {
        Self {
            pattern: pattern.into(),
            desc: None,
            usage: None,
            category: None,
            react: false,
            public: true,
        }
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Send working/done/failed reactions around each run.
    pub fn react(mut self, react: bool) -> Self {
        self.react = react;
        self
    }

    /// Whether anyone may invoke the command. Non-public commands are limited
    /// to the bot itself, the owner and sudo users.
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

impl Descriptor for CommandOptions {
    type Context = CommandContext;

    fn install(self, registry: &mut Registry, service: HandlerService<CommandContext>) {
        let handler = CommandHandler {
            pattern: self.pattern,
            desc: non_empty(self.desc).unwrap_or_else(|| DEFAULT_DESC.to_string()),
            usage: self.usage.unwrap_or_default(),
            category: non_empty(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            react: self.react,
            public: self.public,
            service,
        };
        registry.insert_command(handler);
    }
}

/// Descriptor of an event handler.
#[derive(Debug, Clone)]
pub struct EventOptions {
    event_type: EventType,
    desc: Option<String>,
    react: bool,
    public: bool,
}

impl EventOptions {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            desc: None,
            react: false,
            public: true,
        }
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn react(mut self, react: bool) -> Self {
        self.react = react;
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

impl Descriptor for EventOptions {
    type Context = EventContext;

    fn install(self, registry: &mut Registry, service: HandlerService<EventContext>) {
        let event_type = self.event_type;
        let handler = EventHandler {
            event_type,
            desc: non_empty(self.desc).unwrap_or_else(|| format!("{event_type} event handler")),
            react: self.react,
            public: self.public,
            service,
        };
        registry.events.entry(event_type).or_default().push(handler);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// =============================================================================
// Stored handlers
// =============================================================================

/// A registered command handler.
#[derive(Clone)]
pub struct CommandHandler {
    pub pattern: Pattern,
    pub desc: String,
    pub usage: String,
    pub category: String,
    pub react: bool,
    pub public: bool,
    service: HandlerService<CommandContext>,
}

impl CommandHandler {
    /// A fresh handle to the callback service.
    pub fn service(&self) -> HandlerService<CommandContext> {
        self.service.clone()
    }
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("pattern", &self.pattern)
            .field("desc", &self.desc)
            .field("usage", &self.usage)
            .field("category", &self.category)
            .field("react", &self.react)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// A registered event handler.
#[derive(Clone)]
pub struct EventHandler {
    pub event_type: EventType,
    pub desc: String,
    pub react: bool,
    pub public: bool,
    service: HandlerService<EventContext>,
}

impl EventHandler {
    pub fn service(&self) -> HandlerService<EventContext> {
        self.service.clone()
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("event_type", &self.event_type)
            .field("desc", &self.desc)
            .field("react", &self.react)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Command and event handler tables.
#[derive(Clone, Default)]
pub struct Registry {
    commands: Vec<CommandHandler>,
    events: HashMap<EventType, Vec<EventHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `descriptor`.
    pub fn register<D, F, Fut, R>(&mut self, descriptor: D, callback: F) -> &mut Self
    where
        D: Descriptor,
        F: Fn(Arc<NormalizedMessage>, D::Context) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerResult,
    {
        descriptor.install(self, into_service(callback));
        self
    }

    /// Registers a command handler.
    pub fn command<F, Fut, R>(&mut self, options: CommandOptions, callback: F) -> &mut Self
    where
        F: Fn(Arc<NormalizedMessage>, CommandContext) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerResult,
    {
        self.register(options, callback)
    }

    /// Registers an event handler.
    pub fn on<F, Fut, R>(&mut self, options: EventOptions, callback: F) -> &mut Self
    where
        F: Fn(Arc<NormalizedMessage>, EventContext) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerResult,
    {
        self.register(options, callback)
    }

    fn insert_command(&mut self, handler: CommandHandler) {
        match self
            .commands
            .iter_mut()
            .find(|existing| existing.pattern.same_key(&handler.pattern))
        {
            Some(existing) => {
                tracing::debug!(pattern = %handler.pattern, "Replacing command handler");
                *existing = handler;
            }
            None => self.commands.push(handler),
        }
    }

    /// All command handlers in matching order.
    pub fn commands(&self) -> &[CommandHandler] {
        &self.commands
    }

    /// The handlers registered for `event_type`, in registration order.
    pub fn event_handlers(&self, event_type: EventType) -> &[EventHandler] {
        self.events.get(&event_type).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if at least one handler exists for `event_type`.
    pub fn has_event_handlers(&self, event_type: EventType) -> bool {
        !self.event_handlers(event_type).is_empty()
    }

    /// Commands whose pattern text contains `query`, case-insensitively.
    pub fn find(&self, query: &str) -> Vec<&CommandHandler> {
        let query = query.to_lowercase();
        self.commands
            .iter()
            .filter(|cmd| cmd.pattern.as_str().to_lowercase().contains(&query))
            .collect()
    }

    /// Commands grouped by category. Categories appear in the order their
    /// first command was registered.
    pub fn categories(&self) -> Vec<(&str, Vec<&CommandHandler>)> {
        let mut groups: Vec<(&str, Vec<&CommandHandler>)> = Vec::new();
        for cmd in &self.commands {
            match groups.iter_mut().find(|(name, _)| *name == cmd.category) {
                Some((_, list)) => list.push(cmd),
                None => groups.push((cmd.category.as_str(), vec![cmd])),
            }
        }
        groups
    }

    /// Appends every handler of `other`, applying the same replace/append
    /// rules as registration.
    pub fn merge(&mut self, other: Registry) {
        for cmd in other.commands {
            self.insert_command(cmd);
        }
        for event_type in EventType::ALL {
            if let Some(handlers) = other.events.get(&event_type) {
                self.events
                    .entry(event_type)
                    .or_default()
                    .extend(handlers.iter().cloned());
            }
        }
    }

    /// Number of command handlers.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Number of event handlers across all types.
    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.command_count() == 0 && self.event_count() == 0
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.commands)
            .field("events", &self.event_count())
            .finish()
    }
}

// =============================================================================
// SharedRegistry
// =============================================================================

/// A registry shared between the dispatcher and the plugin loader.
///
/// Readers take an `Arc<Registry>` snapshot and never hold the lock across an
/// await. Writers replace the whole registry at once, so a dispatch in flight
/// keeps the snapshot it started with.
#[derive(Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Arc<Registry>>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// The current registry.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.inner.read().clone()
    }

    /// Installs `registry`, returning the one it replaced.
    pub fn replace(&self, registry: Registry) -> Arc<Registry> {
        std::mem::replace(&mut *self.inner.write(), Arc::new(registry))
    }

    /// Applies `f` to a copy of the current registry and installs the result.
    pub fn update(&self, f: impl FnOnce(&mut Registry)) {
        let mut guard = self.inner.write();
        let mut next = Registry::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }
}

impl fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedRegistry").field(&self.snapshot()).finish()
    }
}
