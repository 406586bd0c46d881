//! The `info` plugin: `ping`, `alive` and `menu`.

use std::fmt::Write as _;
use std::time::Instant;

use tower::BoxError;

use crate::matcher::format_uptime;
use crate::plugin::PluginDescriptor;
use crate::registry::{CommandHandler, CommandOptions, Registry};

pub const INFO_PLUGIN: PluginDescriptor = crate::define_plugin! {
    name: "info",
    desc: "Responsiveness, status and command listing",
    setup: setup,
};

fn setup(registry: &mut Registry) -> Result<(), BoxError> {
    registry.command(
        CommandOptions::new("ping")
            .desc("Check bot responsiveness")
            .usage("ping")
            .category("info")
            .public(false),
        |msg, ctx| async move {
            let start = Instant::now();
            ctx.reply(&msg, "Measuring ping...").await?;
            let elapsed = start.elapsed().as_millis();
            ctx.reply(&msg, &format!("Pong! {elapsed}ms")).await
        },
    );

    registry.command(
        CommandOptions::new("alive")
            .desc("Check if bot is alive")
            .category("info")
            .react(true)
            .public(false),
        |msg, ctx| async move {
            let text = format!(
                "STATUS\n\n User: {}\n Prefix: {}\n Uptime: {}",
                msg.push_name.as_deref().unwrap_or("unknown"),
                ctx.prefix,
                format_uptime(ctx.session().uptime()),
            );
            ctx.reply(&msg, &text).await
        },
    );

    registry.command(
        CommandOptions::new("menu")
            .desc("Display all bot commands by categories")
            .usage("menu [category/command]")
            .category("info")
            .react(true),
        |msg, ctx| async move {
            let text = menu_reply(
                ctx.session().registry(),
                &ctx.prefix,
                ctx.args.first().map(String::as_str),
            );
            ctx.reply(&msg, &text).await
        },
    );

    Ok(())
}

/// Builds the `menu` reply for an optional query.
///
/// A query matching part of a command pattern shows that command's details;
/// otherwise a query naming a category lists that category; otherwise a
/// not-found notice is returned. Without a query all categories are listed.
pub fn menu_reply(registry: &Registry, prefix: &str, query: Option<&str>) -> String {
    let Some(query) = query.map(|q| q.to_lowercase()) else {
        return render_menu(registry, prefix);
    };

    if let Some(cmd) = registry.find(&query).first() {
        return render_command(cmd, prefix);
    }

    let category = registry
        .categories()
        .into_iter()
        .find(|(name, _)| name.to_lowercase() == query);
    match category {
        Some((name, cmds)) => render_category(name, &cmds, prefix),
        None => format!(
            "\"{query}\" not found as a command or category. Use {prefix}menu to see all categories."
        ),
    }
}

fn render_command(cmd: &CommandHandler, prefix: &str) -> String {
    format!(
        "Command: {prefix}{}\nDescription: {}\nUsage: {}\nCategory: {}",
        cmd.pattern, cmd.desc, cmd.usage, cmd.category
    )
}

fn render_category(name: &str, cmds: &[&CommandHandler], prefix: &str) -> String {
    let mut out = format!(
        "Prefix: {prefix}\nCategory: {}\nCommands: {}\n",
        name.to_uppercase(),
        cmds.len()
    );
    for pattern in sorted_patterns(cmds) {
        let _ = write!(out, "\n│ {pattern}");
    }
    out
}

fn render_menu(registry: &Registry, prefix: &str) -> String {
    let mut out = format!("Prefix: {prefix}\nCommands: {}\n", registry.command_count());

    let mut categories = registry.categories();
    categories.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    for (name, cmds) in categories {
        let _ = write!(out, "\n╭── {} ──", name.to_uppercase());
        for pattern in sorted_patterns(&cmds) {
            let _ = write!(out, "\n│ {pattern}");
        }
        out.push_str("\n╰───────\n");
    }
    out
}

fn sorted_patterns(cmds: &[&CommandHandler]) -> Vec<String> {
    let mut patterns: Vec<String> = cmds.iter().map(|c| c.pattern.to_string()).collect();
    patterns.sort();
    patterns
}
