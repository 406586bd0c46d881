//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, ChimeConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ChimeConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    validate_logging_config(&config.logging)?;

    if let Some(name) = config.plugins.disabled.iter().find(|n| n.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Disabled plugin names must not be blank (got {name:?})"
        )));
    }

    Ok(())
}

fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if bot.prefix.is_empty() {
        return Err(ConfigError::validation("bot.prefix must not be empty"));
    }
    if bot.prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "bot.prefix must not contain whitespace (got {:?})",
            bot.prefix
        )));
    }
    if bot.owner.as_deref().is_some_and(|o| o.trim().is_empty()) {
        return Err(ConfigError::validation("bot.owner must not be blank"));
    }
    if bot.sudo.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::validation("bot.sudo entries must not be blank"));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }
    if let Some(target) = logging.filters.keys().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Log filter targets must not be blank (got {target:?})"
        )));
    }
    Ok(())
}
