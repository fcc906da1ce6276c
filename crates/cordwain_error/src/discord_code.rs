//! Discord JSON error codes.

/// Known `code` values of Discord's `{code, message}` error body.
///
/// Only the codes callers commonly branch on are listed; unknown codes stay
/// available as the raw number on [`crate::RestErrorKind::Client`].
///
/// # Examples
///
/// ```
/// use cordwain_error::DiscordErrorCode;
///
/// let code = DiscordErrorCode::from_code(10008).unwrap();
/// assert_eq!(code, DiscordErrorCode::UnknownMessage);
/// assert_eq!(code.code(), 10008);
/// assert!(DiscordErrorCode::from_code(1).is_none());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    strum::FromRepr,
    strum::EnumIter,
)]
#[repr(u32)]
pub enum DiscordErrorCode {
    /// Unknown account
    #[display("Unknown account")]
    UnknownAccount = 10001,
    /// Unknown application
    #[display("Unknown application")]
    UnknownApplication = 10002,
    /// Unknown channel
    #[display("Unknown channel")]
    UnknownChannel = 10003,
    /// Unknown guild
    #[display("Unknown guild")]
    UnknownGuild = 10004,
    /// Unknown member
    #[display("Unknown member")]
    UnknownMember = 10007,
    /// Unknown message
    #[display("Unknown message")]
    UnknownMessage = 10008,
    /// Unknown role
    #[display("Unknown role")]
    UnknownRole = 10011,
    /// Unknown user
    #[display("Unknown user")]
    UnknownUser = 10013,
    /// Unknown emoji
    #[display("Unknown Emoji")]
    UnknownEmoji = 10014,
    /// Unknown webhook
    #[display("Unknown webhook")]
    UnknownWebhook = 10015,
    /// Unknown interaction
    #[display("Unknown interaction")]
    UnknownInteraction = 10062,
    /// Bots cannot use this endpoint
    #[display("Bots cannot use this endpoint")]
    BotsCannotUseEndpoint = 20001,
    /// Slowmode rate limit
    #[display("This action cannot be performed due to slowmode rate limit")]
    SlowmodeRateLimit = 20016,
    /// Too many reactions
    #[display("Too many reactions")]
    TooManyReactions = 30010,
    /// Unauthorized
    #[display("Unauthorized. Provide a valid token and try again")]
    Unauthorized = 40001,
    /// Missing access
    #[display("Missing access")]
    MissingAccess = 50001,
    /// Cannot edit a message authored by another user
    #[display("Cannot edit a message authored by another user")]
    CannotEditForeignMessage = 50005,
    /// Cannot send an empty message
    #[display("Cannot send an empty message")]
    CannotSendEmptyMessage = 50006,
    /// Missing permissions
    #[display("Missing permissions")]
    MissingPermissions = 50013,
    /// Invalid authentication token
    #[display("Invalid authentication token")]
    InvalidAuthenticationToken = 50014,
    /// Note was too long
    #[display("Note was too long")]
    NoteTooLong = 50015,
    /// Too few or too many messages to bulk delete
    #[display("Provided too few or too many messages to delete")]
    InvalidBulkDeleteCount = 50016,
    /// A message provided was too old to bulk delete
    #[display("A message provided was too old to bulk delete")]
    MessageTooOldToBulkDelete = 50034,
    /// Invalid form body
    #[display("Invalid form body")]
    InvalidFormBody = 50035,
}

impl DiscordErrorCode {
    /// Look up a known code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_repr(code)
    }

    /// The numeric code Discord sends.
    pub fn code(self) -> u32 {
        self as u32
    }
}
