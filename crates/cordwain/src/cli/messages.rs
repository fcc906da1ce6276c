//! Message and reaction command handlers.

use cordwain::{
    ConfigError, ConfigErrorKind, CordwainConfig, CordwainError, CordwainResult, ReactionEmoji,
    RestClient, RestError, Snowflake,
};
use tracing::info;

/// Environment variable holding the bot token.
const TOKEN_VAR: &str = "DISCORD_TOKEN";

fn client(config: &CordwainConfig) -> CordwainResult<RestClient> {
    let token = std::env::var(TOKEN_VAR).map_err(|_| {
        CordwainError::from(ConfigError::new(ConfigErrorKind::MissingEnv(
            TOKEN_VAR.to_string(),
        )))
    })?;
    Ok(RestClient::new(token, config)?)
}

/// An audit log reason is only sent with a single delete; the bulk endpoint
/// and the fan-out of single deletes do not carry one.
fn check_reason(messages: &[String], reason: Option<&str>) -> Result<(), RestError> {
    match (messages, reason) {
        ([_, _, ..], Some(_)) => Err(RestError::malformed(
            "--reason can only be used when deleting a single message",
        )),
        _ => Ok(()),
    }
}

/// Delete one or many messages.
pub async fn handle_delete(
    config: &CordwainConfig,
    channel: &str,
    messages: &[String],
    reason: Option<&str>,
) -> CordwainResult<()> {
    check_reason(messages, reason)?;
    let client = client(config)?;

    match messages {
        [single] => {
            client.delete_message_str(channel, single, reason).await?;
            info!(channel, message_id = %single, "Deleted message");
        }
        many => {
            client.delete_messages_str(channel, many).await?;
            info!(channel, count = many.len(), "Deleted messages");
        }
    }
    Ok(())
}

/// Add or remove the bot's reaction.
pub async fn handle_react(
    config: &CordwainConfig,
    channel: &str,
    message: &str,
    emoji: &str,
    remove: bool,
) -> CordwainResult<()> {
    let client = client(config)?;
    let emoji = ReactionEmoji::parse(emoji);

    if remove {
        let channel = Snowflake::parse(channel)?;
        let message = Snowflake::parse(message)?;
        client.remove_own_reaction(channel, message, &emoji).await?;
        info!(%channel, message_id = %message, %emoji, "Removed reaction");
    } else {
        client.add_reaction_str(channel, message, &emoji).await?;
        info!(channel, message_id = message, %emoji, "Added reaction");
    }
    Ok(())
}

/// Print the configuration.
pub fn show_config(config: &CordwainConfig) -> CordwainResult<()> {
    let rendered = serde_json::to_string_pretty(config).map_err(|e| {
        CordwainError::from(ConfigError::new(ConfigErrorKind::Render(e.to_string())))
    })?;
    println!("{}", rendered);
    Ok(())
}
