//! Static catalog of Discord REST endpoints.

use cordwain_error::{RestError, RestResult};
use std::time::Duration;

/// HTTP method of a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl RestMethod {
    /// The equivalent reqwest method.
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            RestMethod::Get => reqwest::Method::GET,
            RestMethod::Post => reqwest::Method::POST,
            RestMethod::Put => reqwest::Method::PUT,
            RestMethod::Patch => reqwest::Method::PATCH,
            RestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A Discord REST route.
///
/// Each endpoint knows its URL template, which path parameter Discord scopes
/// its rate limit to (the major parameter), and per-route quirks. The HTTP
/// method is chosen per request since Discord reuses paths across methods.
///
/// Parameters fill the `{}` placeholders in order; any parameters beyond the
/// placeholders are appended as extra path segments.
///
/// # Examples
///
/// ```
/// use cordwain_rest::RestEndpoint;
///
/// let url = RestEndpoint::MessageDelete
///     .resolve_path(&["41771983423143937", "1001"])
///     .unwrap();
/// assert_eq!(url, "/channels/41771983423143937/messages/1001");
/// assert_eq!(
///     RestEndpoint::MessageDelete.major_parameter(&["41771983423143937", "1001"]),
///     Some("41771983423143937")
/// );
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RestEndpoint {
    /// Gateway URL
    Gateway,
    /// Gateway URL with sharding info
    GatewayBot,
    /// Channel messages (create, fetch)
    Message,
    /// Single message deletion
    MessageDelete,
    /// Bulk message deletion
    MessagesBulkDelete,
    /// Typing indicator
    ChannelTyping,
    /// Channel invites
    ChannelInvite,
    /// A user
    User,
    /// Direct message channels of the current user
    UserChannel,
    /// A channel
    Channel,
    /// Guild roles
    Role,
    /// Guilds
    Server,
    /// Guild prune
    ServerPrune,
    /// Guild membership of the current user
    ServerSelf,
    /// Guild channels
    ServerChannel,
    /// Message reactions
    Reaction,
    /// Pinned messages
    Pins,
    /// A guild member
    ServerMember,
    /// A role of a guild member
    ServerMemberRole,
    /// Nickname of the current user
    OwnNickname,
    /// Application info of the current bot
    SelfInfo,
    /// Channel webhooks
    ChannelWebhook,
    /// Guild webhooks
    ServerWebhook,
    /// Guild invites
    ServerInvite,
    /// A webhook
    Webhook,
    /// Webhook execution by token
    WebhookSend,
    /// Messages sent by a webhook
    WebhookMessage,
    /// An invite
    Invite,
    /// Guild bans
    Ban,
    /// The current user
    CurrentUser,
    /// Guild audit log
    AuditLog,
    /// Guild emojis
    CustomEmoji,
    /// Stickers
    Sticker,
    /// Sticker packs
    StickerPack,
    /// Guild stickers
    ServerSticker,
    /// Interaction callback
    InteractionResponse,
    /// Original response of an interaction
    OriginalInteractionResponse,
    /// Global application commands
    ApplicationCommands,
    /// Guild application commands
    ServerApplicationCommands,
    /// Permissions of all guild application commands
    ServerApplicationCommandPermissions,
    /// Permissions of one guild application command
    ApplicationCommandPermissions,
    /// Thread started from a message
    StartThreadWithMessage,
    /// Thread without a message
    StartThreadWithoutMessage,
    /// Join or leave a thread
    JoinLeaveThread,
    /// Add or remove a thread member
    AddRemoveThreadMember,
    /// Thread members
    ListThreadMembers,
    /// Active guild threads
    ListActiveThreads,
    /// Archived public threads
    ListPublicArchivedThreads,
    /// Archived private threads
    ListPrivateArchivedThreads,
    /// Archived private threads the current user joined
    ListJoinedPrivateArchivedThreads,
    /// A thread member
    ThreadMember,
}

impl RestEndpoint {
    /// URL template relative to the API root.
    pub fn template(self) -> &'static str {
        use RestEndpoint::*;
        match self {
            Gateway => "/gateway",
            GatewayBot => "/gateway/bot",
            Message | MessageDelete => "/channels/{}/messages",
            MessagesBulkDelete => "/channels/{}/messages/bulk-delete",
            ChannelTyping => "/channels/{}/typing",
            ChannelInvite => "/channels/{}/invites",
            User => "/users/{}",
            UserChannel => "/users/@me/channels",
            Channel => "/channels/{}",
            Role => "/guilds/{}/roles",
            Server => "/guilds",
            ServerPrune => "/guilds/{}/prune",
            ServerSelf => "/users/@me/guilds/{}",
            ServerChannel => "/guilds/{}/channels",
            Reaction => "/channels/{}/messages/{}/reactions",
            Pins => "/channels/{}/pins",
            ServerMember => "/guilds/{}/members/{}",
            ServerMemberRole => "/guilds/{}/members/{}/roles/{}",
            OwnNickname => "/guilds/{}/members/@me/nick",
            SelfInfo => "/oauth2/applications/@me",
            ChannelWebhook => "/channels/{}/webhooks",
            ServerWebhook => "/guilds/{}/webhooks",
            ServerInvite => "/guilds/{}/invites",
            Webhook => "/webhooks/{}",
            WebhookSend => "/webhooks/{}/{}",
            WebhookMessage => "/webhooks/{}/{}/messages/{}",
            Invite => "/invites/{}",
            Ban => "/guilds/{}/bans",
            CurrentUser => "/users/@me",
            AuditLog => "/guilds/{}/audit-logs",
            CustomEmoji => "/guilds/{}/emojis",
            Sticker => "/stickers",
            StickerPack => "/sticker-packs",
            ServerSticker => "/guilds/{}/stickers",
            InteractionResponse => "/interactions/{}/{}/callback",
            OriginalInteractionResponse => "/webhooks/{}/{}/messages/@original",
            ApplicationCommands => "/applications/{}/commands",
            ServerApplicationCommands => "/applications/{}/guilds/{}/commands",
            ServerApplicationCommandPermissions => {
                "/applications/{}/guilds/{}/commands/permissions"
            }
            ApplicationCommandPermissions => "/applications/{}/guilds/{}/commands/{}/permissions",
            StartThreadWithMessage => "/channels/{}/messages/{}/threads",
            StartThreadWithoutMessage => "/channels/{}/threads",
            JoinLeaveThread => "/channels/{}/thread-members/@me",
            AddRemoveThreadMember | ThreadMember => "/channels/{}/thread-members/{}",
            ListThreadMembers => "/channels/{}/thread-members",
            ListActiveThreads => "/guilds/{}/threads/active",
            ListPublicArchivedThreads => "/channels/{}/threads/archived/public",
            ListPrivateArchivedThreads => "/channels/{}/threads/archived/private",
            ListJoinedPrivateArchivedThreads => "/channels/{}/users/@me/threads/archived/private",
        }
    }

    /// Index of the path parameter Discord scopes this route's limit to.
    pub fn major_parameter_position(self) -> Option<usize> {
        use RestEndpoint::*;
        match self {
            Gateway
            | GatewayBot
            | User
            | UserChannel
            | Server
            | SelfInfo
            | Invite
            | CurrentUser
            | Sticker
            | StickerPack
            | InteractionResponse
            | OriginalInteractionResponse
            | ApplicationCommands => None,
            // The application id comes first; the guild id scopes the limit.
            ServerApplicationCommands
            | ServerApplicationCommandPermissions
            | ApplicationCommandPermissions => Some(1),
            _ => Some(0),
        }
    }

    /// Number of `{}` placeholders in the template.
    pub fn placeholder_count(self) -> usize {
        self.template().matches("{}").count()
    }

    /// Fixed reset window overriding what Discord reports.
    ///
    /// Discord under-reports the reaction bucket, so reactions are paced at
    /// one request per 250ms per channel regardless of the headers.
    pub fn hardcoded_ratelimit(self) -> Option<Duration> {
        match self {
            RestEndpoint::Reaction => Some(Duration::from_millis(250)),
            _ => None,
        }
    }

    /// Retry ceiling for routes known to hit their limits often.
    ///
    /// `None` means the configured default applies.
    pub fn default_retries(self) -> Option<u32> {
        match self {
            RestEndpoint::MessageDelete | RestEndpoint::Reaction => Some(250),
            _ => None,
        }
    }

    /// Whether requests count toward the bot's global rate limit.
    ///
    /// Webhook executions and interaction callbacks authenticate with a token
    /// in the URL and are exempt from the global limit.
    pub fn consumes_global(self) -> bool {
        !matches!(
            self,
            RestEndpoint::InteractionResponse
                | RestEndpoint::OriginalInteractionResponse
                | RestEndpoint::WebhookSend
                | RestEndpoint::WebhookMessage
        )
    }

    /// The major parameter value for the given path parameters, if any.
    pub fn major_parameter<'a, S: AsRef<str>>(self, params: &'a [S]) -> Option<&'a str> {
        let position = self.major_parameter_position()?;
        params.get(position).map(AsRef::as_ref)
    }

    /// Substitute path parameters into the template.
    ///
    /// Parameters are percent-encoded as path segments. Extra parameters are
    /// appended as further segments.
    ///
    /// # Errors
    ///
    /// Returns a malformed-input error when fewer parameters are given than the
    /// template has placeholders.
    #[track_caller]
    pub fn resolve_path<S: AsRef<str>>(self, params: &[S]) -> RestResult<String> {
        let needed = self.placeholder_count();
        if params.len() < needed {
            return Err(RestError::malformed(format!(
                "{} needs {} url parameters but got {}",
                self,
                needed,
                params.len()
            )));
        }

        let mut segments = self.template().split("{}");
        let mut path = String::with_capacity(self.template().len() + 20 * params.len());
        path.push_str(segments.next().unwrap_or_default());
        for (param, tail) in params.iter().zip(segments) {
            path.push_str(&encode_segment(param.as_ref()));
            path.push_str(tail);
        }
        for extra in &params[needed..] {
            path.push('/');
            path.push_str(&encode_segment(extra.as_ref()));
        }
        Ok(path)
    }
}

/// Percent-encode a path segment, keeping `@` and `:` which are legal in paths.
fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw)
        .replace("%40", "@")
        .replace("%3A", ":")
}
