//! Plugin load passes.
//!
//! A load pass builds a brand-new [`Registry`] from a list of plugin units and
//! swaps it into the [`SharedRegistry`] in one step:
//!
//! 1. Units named in the disabled list are skipped.
//! 2. Units with an incompatible API version are skipped.
//! 3. Each remaining unit runs its setup against a scratch registry. A setup
//!    that returns an error or panics is logged and dropped; nothing it
//!    registered reaches the live registry.
//! 4. Scratch registries of successful units are merged in load order.
//!
//! Dispatches already in flight keep the registry snapshot they started with.
//! Concurrent load passes are serialized.

use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::Mutex;
use tracing::{error, info, info_span, warn};

use super::{CHIME_PLUGIN_API_VERSION, LINKED_PLUGINS, PluginDescriptor};
use crate::error::{PluginError, panic_message};
use crate::registry::{Registry, SharedRegistry};

/// Summary of one load pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Units whose handlers are now live, in load order.
    pub loaded: Vec<&'static str>,
    /// Units skipped because they are disabled.
    pub disabled: Vec<&'static str>,
    /// Units that failed to load.
    pub failed: Vec<PluginError>,
    pub commands: usize,
    pub events: usize,
}

/// Populates a [`SharedRegistry`] from plugin units.
#[derive(Debug)]
pub struct PluginLoader {
    registry: SharedRegistry,
    disabled: Vec<String>,
    pass: Mutex<()>,
}

impl PluginLoader {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            disabled: Vec::new(),
            pass: Mutex::new(()),
        }
    }

    /// Names of units to skip.
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Units linked into the binary with [`link_plugin!`](crate::link_plugin).
    pub fn linked() -> &'static [PluginDescriptor] {
        &LINKED_PLUGINS
    }

    /// Replaces the live registry with one built from `plugins`.
    pub fn load(&self, plugins: &[PluginDescriptor]) -> LoadReport {
        let _pass = self.pass.lock();
        let _span = info_span!("load_plugins", units = plugins.len()).entered();

        let mut registry = Registry::new();
        let mut report = LoadReport::default();

        for plugin in plugins {
            if self.disabled.iter().any(|name| name == plugin.name) {
                info!(plugin = plugin.name, "Plugin disabled, skipping");
                report.disabled.push(plugin.name);
                continue;
            }

            match stage(plugin) {
                Ok(staged) => {
                    info!(
                        plugin = plugin.name,
                        version = plugin.version,
                        commands = staged.command_count(),
                        events = staged.event_count(),
                        "Plugin loaded"
                    );
                    registry.merge(staged);
                    report.loaded.push(plugin.name);
                }
                Err(e) => {
                    match &e {
                        PluginError::IncompatibleApi { .. } => {
                            warn!(plugin = plugin.name, error = %e, "Plugin skipped")
                        }
                        _ => error!(plugin = plugin.name, error = %e, "Failed to load plugin"),
                    }
                    report.failed.push(e);
                }
            }
        }

        report.commands = registry.command_count();
        report.events = registry.event_count();
        self.registry.replace(registry);

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            commands = report.commands,
            events = report.events,
            "Plugins installed"
        );
        report
    }

    /// Loads every linked unit.
    pub fn load_linked(&self) -> LoadReport {
        self.load(Self::linked())
    }
}

/// Runs one unit's setup against a scratch registry.
fn stage(plugin: &PluginDescriptor) -> Result<Registry, PluginError> {
    if !plugin.is_compatible() {
        return Err(PluginError::IncompatibleApi {
            plugin: plugin.name,
            found: plugin.api_version,
            host: CHIME_PLUGIN_API_VERSION,
        });
    }

    let mut scratch = Registry::new();
    match catch_unwind(AssertUnwindSafe(|| plugin.setup(&mut scratch))) {
        Ok(Ok(())) => Ok(scratch),
        Ok(Err(source)) => Err(PluginError::SetupFailed {
            plugin: plugin.name,
            source,
        }),
        Err(payload) => Err(PluginError::SetupPanicked {
            plugin: plugin.name,
            message: panic_message(payload.as_ref()),
        }),
    }
}
