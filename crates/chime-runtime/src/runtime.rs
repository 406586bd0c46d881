//! Runtime orchestration.
//!
//! [`ChimeRuntime`] wires configuration, logging, plugin loading and the
//! dispatcher together, then drains a stream of inbound messages until
//! shutdown.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use chime_runtime::ChimeRuntime;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! let runtime = ChimeRuntime::builder()
//!     .transport(my_transport)
//!     .build()?;
//!
//! // The transport pushes NormalizedMessages into `tx`.
//! runtime.run(rx).await?;
//! ```
//!
//! Each inbound message is dispatched on its own task. Tasks are tracked, and
//! shutdown (Ctrl+C, SIGTERM, [`ChimeRuntime::shutdown`] or the end of the
//! message stream) waits for in-flight dispatches to finish.

use std::future::Future;
use std::sync::Arc;

use figment::Provider;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use chime_core::{BoxedTransport, NormalizedMessage};
use chime_framework::{Dispatcher, LoadReport, PluginDescriptor, PluginLoader, SharedRegistry};

use crate::config::{ChimeConfig, ConfigLoader};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The Chime runtime: one dispatcher fed by one transport.
pub struct ChimeRuntime {
    config: ChimeConfig,
    registry: SharedRegistry,
    loader: PluginLoader,
    dispatcher: Arc<Dispatcher>,
    /// Units loaded in addition to the linked ones.
    extra_plugins: Vec<PluginDescriptor>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl ChimeRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration and loads plugins.
    ///
    /// Initializes logging from `config.logging` unless a subscriber is
    /// already installed.
    pub fn from_config(config: &ChimeConfig, transport: BoxedTransport) -> Self {
        Self::with_plugins(config, transport, Vec::new())
    }

    fn with_plugins(
        config: &ChimeConfig,
        transport: BoxedTransport,
        extra_plugins: Vec<PluginDescriptor>,
    ) -> Self {
        logging::init_from_config(&config.logging);

        let registry = SharedRegistry::default();
        let loader =
            PluginLoader::new(registry.clone()).with_disabled(config.plugins.disabled.clone());
        let dispatcher = Dispatcher::new(registry.clone(), transport)
            .with_prefix(config.bot.prefix.clone())
            .with_policy(config.bot.policy());

        info!(
            prefix = %config.bot.prefix,
            owner = config.bot.owner.is_some(),
            sudo = config.bot.sudo.len(),
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        let runtime = Self {
            config: config.clone(),
            registry,
            loader,
            dispatcher: Arc::new(dispatcher),
            extra_plugins,
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        };
        runtime.load_plugins();
        runtime
    }

    pub fn config(&self) -> &ChimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Every unit this runtime loads, in load order: built-ins (with the
    /// `builtin-plugins` feature), then linked units, then units added
    /// through [`RuntimeBuilder::plugin`].
    pub fn plugin_units(&self) -> Vec<PluginDescriptor> {
        let mut units = Vec::new();
        #[cfg(feature = "builtin-plugins")]
        units.extend_from_slice(chime_framework::plugin::builtin::ALL);
        units.extend_from_slice(PluginLoader::linked());
        units.extend_from_slice(&self.extra_plugins);
        units
    }

    /// Rebuilds the registry from every plugin unit and swaps it in.
    ///
    /// Dispatches already running keep the registry they started with.
    pub fn load_plugins(&self) -> LoadReport {
        self.loader.load(&self.plugin_units())
    }

    /// Alias of [`load_plugins`](Self::load_plugins) for reload call sites.
    pub fn reload_plugins(&self) -> LoadReport {
        info!("Reloading plugins");
        self.load_plugins()
    }

    /// Dispatches one message and waits for it. Returns `true` if handled.
    pub async fn dispatch(&self, message: NormalizedMessage) -> bool {
        self.dispatcher.execute_command(Arc::new(message)).await
    }

    /// Dispatches one message on a tracked background task.
    pub fn handle(&self, message: NormalizedMessage) {
        let dispatcher = Arc::clone(&self.dispatcher);
        self.tracker.spawn(async move {
            dispatcher.execute_command(Arc::new(message)).await;
        });
    }

    /// A token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Dispatches messages from `messages` until Ctrl+C, SIGTERM, a
    /// [`shutdown`](Self::shutdown) call or the end of the stream.
    pub async fn run(&self, messages: mpsc::Receiver<NormalizedMessage>) -> RuntimeResult<()> {
        info!("Chime runtime is now running. Press Ctrl+C to stop.");
        self.run_until(messages, async {
            if let Err(e) = wait_for_signal().await {
                error!(error = %e, "Failed to listen for shutdown signals");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Like [`run`](Self::run), with a custom shutdown future instead of
    /// process signals.
    pub async fn run_until<F>(
        &self,
        mut messages: mpsc::Receiver<NormalizedMessage>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("Shutdown requested");
                    break;
                }
                _ = &mut shutdown => break,
                message = messages.recv() => match message {
                    Some(message) => self.handle(message),
                    None => {
                        info!("Message stream closed");
                        break;
                    }
                },
            }
        }

        self.drain().await;
        Ok(())
    }

    /// Waits for every tracked dispatch to finish.
    async fn drain(&self) {
        self.tracker.close();
        debug!(in_flight = self.tracker.len(), "Waiting for in-flight dispatches");
        self.tracker.wait().await;
        self.tracker.reopen();
        info!("Runtime stopped");
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`ChimeRuntime`] with loaded configuration.
///
/// ```rust,ignore
/// let runtime = ChimeRuntime::builder()
///     .config_file("deploy/chime.toml")
///     .profile("production")
///     .transport(transport)
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    transport: Option<BoxedTransport>,
    plugins: Vec<PluginDescriptor>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            transport: None,
            plugins: Vec::new(),
        }
    }

    /// The transport replies and reactions go out on. Required.
    pub fn transport(mut self, transport: BoxedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Adds a plugin unit on top of the linked ones.
    pub fn plugin(mut self, plugin: PluginDescriptor) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a provider over files and environment.
    pub fn merge(mut self, provider: impl Provider) -> Self {
        self.config_loader = self.config_loader.merge(provider);
        self
    }

    /// Loads configuration, initializes logging and loads plugins.
    pub fn build(self) -> RuntimeResult<ChimeRuntime> {
        let transport = self.transport.ok_or(RuntimeError::MissingTransport)?;
        let config = self.config_loader.load()?;
        Ok(ChimeRuntime::with_plugins(&config, transport, self.plugins))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use chime_core::{MessageKey, Transport, TransportResult};
    use chime_framework::{BoxError, CommandOptions, Registry};
    use figment::providers::Serialized;

    use super::*;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<String>>);

    #[async_trait]
    impl Transport for Outbox {
        async fn send_text(
            &self,
            _chat: &str,
            text: &str,
            _quoted: Option<&MessageKey>,
        ) -> TransportResult<()> {
            self.0.lock().push(text.to_string());
            Ok(())
        }

        async fn react(&self, _chat: &str, _key: &MessageKey, _emoji: &str) -> TransportResult<()> {
            Ok(())
        }

        async fn block(&self, _jid: &str) -> TransportResult<()> {
            Ok(())
        }

        async fn unblock(&self, _jid: &str) -> TransportResult<()> {
            Ok(())
        }
    }

    fn setup_echo(registry: &mut Registry) -> Result<(), BoxError> {
        registry.command(
            CommandOptions::new("echo").public(true),
            |msg, ctx| async move { ctx.reply(&msg, &ctx.text).await },
        );
        Ok(())
    }

    const ECHO: PluginDescriptor = chime_framework::define_plugin! {
        name: "echo",
        setup: setup_echo,
    };

    fn message(body: &str) -> NormalizedMessage {
        NormalizedMessage::new(MessageKey::new("M1", "555@s.whatsapp.net"), "999@s.whatsapp.net")
            .with_sender("555@s.whatsapp.net")
            .with_body(body)
    }

    fn runtime(config: ChimeConfig, outbox: &Arc<Outbox>) -> ChimeRuntime {
        ChimeRuntime::builder()
            .transport(outbox.clone())
            .plugin(ECHO)
            .merge(Serialized::defaults(config))
            .search_path(std::env::temp_dir().join("chime-runtime-tests-none"))
            .without_env()
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_transport() {
        let result = ChimeRuntime::builder().without_env().build();
        assert!(matches!(result, Err(RuntimeError::MissingTransport)));
    }

    #[tokio::test]
    async fn test_dispatch_uses_configured_prefix() {
        let outbox = Arc::new(Outbox::default());
        let mut config = ChimeConfig::default();
        config.bot.prefix = "!".into();
        let runtime = runtime(config, &outbox);

        assert!(runtime.registry().snapshot().command_count() >= 1);
        assert!(!runtime.dispatch(message(".echo hi")).await);
        assert!(runtime.dispatch(message("!echo hi there")).await);
        assert_eq!(*outbox.0.lock(), ["hi there"]);
    }

    #[tokio::test]
    async fn test_disabled_plugin_is_not_loaded() {
        let outbox = Arc::new(Outbox::default());
        let mut config = ChimeConfig::default();
        config.plugins.disabled = vec!["echo".into()];
        let runtime = runtime(config, &outbox);

        let report = runtime.reload_plugins();
        assert_eq!(report.disabled, ["echo"]);
        assert!(!runtime.dispatch(message(".echo hi")).await);
    }

    #[tokio::test]
    async fn test_run_until_drains_stream() {
        let outbox = Arc::new(Outbox::default());
        let runtime = runtime(ChimeConfig::default(), &outbox);

        let (tx, rx) = mpsc::channel(8);
        tx.send(message(".echo one")).await.unwrap();
        tx.send(message(".echo two")).await.unwrap();
        drop(tx);

        runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();

        let mut sent = outbox.0.lock().clone();
        sent.sort();
        assert_eq!(sent, ["one", "two"]);
    }

    #[tokio::test]
    async fn test_shutdown_token_stops_run() {
        let outbox = Arc::new(Outbox::default());
        let runtime = runtime(ChimeConfig::default(), &outbox);
        let (_tx, rx) = mpsc::channel(8);

        let token = runtime.shutdown_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        runtime
            .run_until(rx, std::future::pending())
            .await
            .unwrap();
    }
}
