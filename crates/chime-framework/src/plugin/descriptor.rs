//! Plugin descriptor: the static handle to a unit of handler definitions.

use tower::BoxError;

use crate::registry::Registry;

/// Current Chime plugin API version (1.0).
pub const CHIME_PLUGIN_API_VERSION: u32 = 0x0001_0000;

/// Signature of a plugin's setup function.
pub type SetupFn = fn(&mut Registry) -> Result<(), BoxError>;

/// A static, `Copy` descriptor of a plugin unit.
///
/// Build one with [`define_plugin!`](crate::define_plugin) and either pass it
/// to the loader directly or link it with
/// [`link_plugin!`](crate::link_plugin).
#[derive(Debug, Clone, Copy)]
pub struct PluginDescriptor {
    /// Plugin API version this descriptor was compiled against.
    pub api_version: u32,

    /// Plugin name, used in logs and in `plugins.disabled`.
    pub name: &'static str,

    pub version: &'static str,

    pub desc: &'static str,

    /// Registers the unit's handlers.
    pub setup: SetupFn,
}

impl PluginDescriptor {
    /// Returns `true` if this descriptor's API version is compatible with the
    /// running framework: same major part, minor part not newer than the
    /// host's.
    pub fn is_compatible(&self) -> bool {
        let (host_major, host_minor) = split_version(CHIME_PLUGIN_API_VERSION);
        let (major, minor) = split_version(self.api_version);
        major == host_major && minor <= host_minor
    }

    /// Runs the setup function against `registry`.
    pub fn setup(&self, registry: &mut Registry) -> Result<(), BoxError> {
        (self.setup)(registry)
    }
}

fn split_version(version: u32) -> (u32, u32) {
    (version >> 16, version & 0xFFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Registry) -> Result<(), BoxError> {
        Ok(())
    }

    fn descriptor(api_version: u32) -> PluginDescriptor {
        PluginDescriptor {
            api_version,
            name: "test",
            version: "0.0.0",
            desc: "",
            setup: noop,
        }
    }

    #[test]
    fn test_compatibility() {
        assert!(descriptor(CHIME_PLUGIN_API_VERSION).is_compatible());
        assert!(descriptor(0x0001_0000).is_compatible());
        assert!(!descriptor(0x0001_0001).is_compatible());
        assert!(!descriptor(0x0002_0000).is_compatible());
        assert!(!descriptor(0x0000_0001).is_compatible());
    }
}
