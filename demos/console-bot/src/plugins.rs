//! Demo plugin units, linked into the binary.

use chime::prelude::*;

fn setup_echo(registry: &mut Registry) -> Result<(), BoxError> {
    registry
        .command(
            CommandOptions::new("echo")
                .desc("Repeats its arguments")
                .usage("echo <text>")
                .category("demo"),
            |msg, ctx| async move {
                if ctx.text.is_empty() {
                    return ctx.reply(&msg, &format!("Usage: {}echo <text>", ctx.prefix)).await;
                }
                ctx.reply(&msg, &ctx.text).await
            },
        )
        .command(
            CommandOptions::new(Pattern::regex("^(?i)whoami$")?)
                .desc("Shows who you are to the bot")
                .usage("whoami")
                .category("demo"),
            |msg, ctx| async move {
                let text = format!(
                    "You are {} ({})",
                    msg.push_name.as_deref().unwrap_or("someone"),
                    msg.sender()
                );
                ctx.reply(&msg, &text).await
            },
        )
        .command(
            CommandOptions::new("boom")
                .desc("Fails on purpose")
                .category("demo")
                .react(true),
            |_msg, _ctx| async { Err::<(), _>("the demo handler failed on purpose") },
        );
    Ok(())
}

fn setup_watchers(registry: &mut Registry) -> Result<(), BoxError> {
    registry
        .on(
            EventOptions::new(EventType::Image).desc("Comments on images"),
            |msg, ctx| async move { ctx.reply(&msg, "Nice picture!").await },
        )
        .on(
            EventOptions::new(EventType::ReplyToBot).desc("Answers replies"),
            |msg, ctx| async move {
                ctx.reply(&msg, &format!("You replied: {}", msg.text())).await
            },
        );
    Ok(())
}

link_plugin! {
    pub static ECHO = define_plugin! {
        name: "echo",
        desc: "Echo and identity commands",
        setup: setup_echo,
    };
}

link_plugin! {
    pub static WATCHERS = define_plugin! {
        name: "watchers",
        desc: "Reacts to images and replies",
        setup: setup_watchers,
    };
}
