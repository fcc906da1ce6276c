//! Entity operations built on the dispatcher.
//!
//! Each operation picks its endpoint, method and retry ceiling and hands the
//! request to [`RestClient::execute`]. String overloads parse ids first and
//! fail without touching the network when one is malformed.

use crate::body::{FileAttachment, RequestBody};
use crate::client::RestClient;
use crate::endpoint::{RestEndpoint, RestMethod};
use crate::request::RestRequest;
use cordwain_core::Snowflake;
use cordwain_error::RestResult;
use tracing::instrument;

/// Retry ceiling for adding reactions.
pub const ADD_REACTION_RETRIES: u32 = 500;

/// An emoji used as a reaction.
///
/// # Examples
///
/// ```
/// use cordwain_core::Snowflake;
/// use cordwain_rest::ReactionEmoji;
///
/// assert_eq!(ReactionEmoji::from("👍").to_string(), "👍");
/// let custom = ReactionEmoji::Custom {
///     name: "blobwave".to_string(),
///     id: Snowflake::new(41771983423143937),
/// };
/// assert_eq!(custom.to_string(), "blobwave:41771983423143937");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ReactionEmoji {
    /// A unicode emoji
    #[display("{}", _0)]
    Unicode(String),
    /// A guild emoji, addressed as `name:id`
    #[display("{}:{}", name, id)]
    Custom {
        /// Emoji name
        name: String,
        /// Emoji id
        id: Snowflake,
    },
}

impl ReactionEmoji {
    /// Read `name:id` (or the `<:name:id>` and animated `<a:name:id>` mention
    /// forms) as a custom emoji and anything else as unicode.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_start_matches('<').trim_end_matches('>');
        let trimmed = trimmed.strip_prefix(':').unwrap_or(trimmed);
        let trimmed = match trimmed.strip_prefix("a:") {
            Some(rest) if rest.contains(':') => rest,
            _ => trimmed,
        };
        if let Some((name, id)) = trimmed.rsplit_once(':') {
            if let (false, Ok(id)) = (name.is_empty(), Snowflake::parse(id)) {
                return ReactionEmoji::Custom {
                    name: name.to_string(),
                    id,
                };
            }
        }
        ReactionEmoji::Unicode(raw.to_string())
    }
}

impl From<&str> for ReactionEmoji {
    fn from(emoji: &str) -> Self {
        ReactionEmoji::Unicode(emoji.to_string())
    }
}

impl From<String> for ReactionEmoji {
    fn from(emoji: String) -> Self {
        ReactionEmoji::Unicode(emoji)
    }
}

impl RestClient {
    /// Delete a message.
    pub async fn delete_message(&self, channel: Snowflake, message: Snowflake) -> RestResult<()> {
        self.delete_message_with_reason(channel, message, None).await
    }

    /// Delete a message, recording a reason in the audit log.
    #[instrument(skip_all, fields(channel = %channel, message_id = %message))]
    pub async fn delete_message_with_reason(
        &self,
        channel: Snowflake,
        message: Snowflake,
        reason: Option<&str>,
    ) -> RestResult<()> {
        let request = RestRequest::new(RestMethod::Delete, RestEndpoint::MessageDelete)
            .url_params([channel, message])
            .maybe_audit_log_reason(reason);
        self.execute(request).await
    }

    /// Delete a message given string ids.
    pub async fn delete_message_str(
        &self,
        channel: &str,
        message: &str,
        reason: Option<&str>,
    ) -> RestResult<()> {
        let channel = Snowflake::parse(channel)?;
        let message = Snowflake::parse(message)?;
        self.delete_message_with_reason(channel, message, reason)
            .await
    }

    /// React to a message as the current user.
    #[instrument(skip_all, fields(channel = %channel, message_id = %message, emoji = %emoji))]
    pub async fn add_reaction(
        &self,
        channel: Snowflake,
        message: Snowflake,
        emoji: &ReactionEmoji,
    ) -> RestResult<()> {
        let request = RestRequest::new(RestMethod::Put, RestEndpoint::Reaction)
            .url_params([
                channel.to_string(),
                message.to_string(),
                emoji.to_string(),
                "@me".to_string(),
            ])
            .retries(ADD_REACTION_RETRIES);
        self.execute(request).await
    }

    /// React to a message given string ids.
    pub async fn add_reaction_str(
        &self,
        channel: &str,
        message: &str,
        emoji: &ReactionEmoji,
    ) -> RestResult<()> {
        let channel = Snowflake::parse(channel)?;
        let message = Snowflake::parse(message)?;
        self.add_reaction(channel, message, emoji).await
    }

    /// Remove the current user's reaction.
    pub async fn remove_own_reaction(
        &self,
        channel: Snowflake,
        message: Snowflake,
        emoji: &ReactionEmoji,
    ) -> RestResult<()> {
        let request = RestRequest::new(RestMethod::Delete, RestEndpoint::Reaction).url_params([
            channel.to_string(),
            message.to_string(),
            emoji.to_string(),
            "@me".to_string(),
        ]);
        self.execute(request).await
    }

    /// Remove every reaction from a message.
    pub async fn remove_all_reactions(
        &self,
        channel: Snowflake,
        message: Snowflake,
    ) -> RestResult<()> {
        let request =
            RestRequest::new(RestMethod::Delete, RestEndpoint::Reaction).url_params([channel, message]);
        self.execute(request).await
    }

    /// Post a message through a webhook and return the created message.
    ///
    /// The webhook token authenticates the call, so the bot token is not sent.
    #[instrument(skip(self, token, payload, files), fields(webhook = %webhook, files = files.len()))]
    pub async fn execute_webhook(
        &self,
        webhook: Snowflake,
        token: &str,
        payload: serde_json::Value,
        files: Vec<FileAttachment>,
    ) -> RestResult<serde_json::Value> {
        let request = RestRequest::new(RestMethod::Post, RestEndpoint::WebhookSend)
            .url_params([webhook.to_string(), token.to_string()])
            .query("wait", true)
            .body(RequestBody::with_files(Some(payload), files))
            .include_authorization_header(false)
            .expect_json();
        self.execute(request).await
    }

    /// Answer an interaction.
    ///
    /// Interaction callbacks carry their own token and are exempt from the
    /// global rate limit.
    #[instrument(skip(self, token, response), fields(interaction = %interaction))]
    pub async fn create_interaction_response(
        &self,
        interaction: Snowflake,
        token: &str,
        response: serde_json::Value,
    ) -> RestResult<()> {
        let request = RestRequest::new(RestMethod::Post, RestEndpoint::InteractionResponse)
            .url_params([interaction.to_string(), token.to_string()])
            .body(RequestBody::Json(response))
            .include_authorization_header(false)
            .consumes_global_ratelimit(false);
        self.execute(request).await
    }
}
