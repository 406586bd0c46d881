//! Plugin declaration macros.

/// Builds a [`PluginDescriptor`](crate::plugin::PluginDescriptor).
///
/// `version` and `desc` default to the calling crate's `CARGO_PKG_VERSION`
/// and `CARGO_PKG_DESCRIPTION`.
///
/// ```rust,ignore
/// use chime::prelude::*;
///
/// fn setup(registry: &mut Registry) -> Result<(), BoxError> {
///     registry.command(CommandOptions::new("echo"), |msg, ctx| async move {
///         ctx.reply(&msg, &ctx.text).await
///     });
///     Ok(())
/// }
///
/// pub static ECHO: PluginDescriptor = define_plugin! {
///     name: "echo",
///     desc: "Repeats its arguments",
///     setup: setup,
/// };
/// ```
#[macro_export]
macro_rules! define_plugin {
    (
        name: $name:literal,
        $(version: $version:literal,)?
        $(desc: $desc:literal,)?
        setup: $setup:expr $(,)?
    ) => {
        $crate::plugin::PluginDescriptor {
            api_version: $crate::plugin::CHIME_PLUGIN_API_VERSION,
            name: $name,
            version: $crate::__plugin_meta!(@version $($version)?),
            desc: $crate::__plugin_meta!(@desc $($desc)?),
            setup: $setup,
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __plugin_meta {
    (@version) => { ::std::env!("CARGO_PKG_VERSION") };
    (@version $v:literal) => { $v };
    (@desc) => { ::std::env!("CARGO_PKG_DESCRIPTION") };
    (@desc $v:literal) => { $v };
}

/// Declares a plugin static and adds it to
/// [`LINKED_PLUGINS`](crate::plugin::LINKED_PLUGINS), so the loader picks it
/// up without any explicit registration.
///
/// ```rust,ignore
/// link_plugin! {
///     pub static ECHO = define_plugin! {
///         name: "echo",
///         setup: setup,
///     };
/// }
/// ```
#[macro_export]
macro_rules! link_plugin {
    ($(#[$meta:meta])* $vis:vis static $ident:ident = $descriptor:expr;) => {
        $(#[$meta])*
        #[$crate::plugin::__linkme::distributed_slice($crate::plugin::LINKED_PLUGINS)]
        #[linkme(crate = $crate::plugin::__linkme)]
        $vis static $ident: $crate::plugin::PluginDescriptor = $descriptor;
    };
}

#[cfg(test)]
mod tests {
    use tower::BoxError;

    use crate::plugin::{CHIME_PLUGIN_API_VERSION, PluginDescriptor};
    use crate::registry::Registry;

    fn setup(_: &mut Registry) -> Result<(), BoxError> {
        Ok(())
    }

    static DEFAULTED: PluginDescriptor = define_plugin! {
        name: "defaulted",
        setup: setup,
    };

    static EXPLICIT: PluginDescriptor = define_plugin! {
        name: "explicit",
        version: "9.9.9",
        desc: "an explicit plugin",
        setup: setup,
    };

    #[test]
    fn test_define_plugin_defaults() {
        assert_eq!(DEFAULTED.name, "defaulted");
        assert_eq!(DEFAULTED.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(DEFAULTED.desc, env!("CARGO_PKG_DESCRIPTION"));
        assert_eq!(DEFAULTED.api_version, CHIME_PLUGIN_API_VERSION);
    }

    #[test]
    fn test_define_plugin_explicit_metadata() {
        assert_eq!(EXPLICIT.version, "9.9.9");
        assert_eq!(EXPLICIT.desc, "an explicit plugin");
        assert!(EXPLICIT.is_compatible());
    }
}
