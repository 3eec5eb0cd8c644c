use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Message transport type (`type`), e.g. `sms` or `mms`.
///
/// Invariant: non-empty after trimming. The value is passed through to the API untouched
/// otherwise; this crate does not restrict the set of transports.
pub struct MessageType(String);

impl MessageType {
    /// JSON field name used by the messages API (`type`).
    pub const FIELD: &'static str = "type";

    /// Create a validated [`MessageType`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Plain SMS.
    pub fn sms() -> Self {
        Self("sms".to_owned())
    }

    /// Multimedia message; usually paired with an attachment.
    pub fn mms() -> Self {
        Self("mms".to_owned())
    }

    /// Borrow the validated type.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Message body (`message`).
///
/// Invariant: non-empty after trimming. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// JSON field name used by the messages API (`message`).
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Sender number (`from-number`).
///
/// Invariant: non-empty after trimming. No E.164 normalization is performed; the number must
/// be one the authenticated user is allowed to send from.
pub struct FromNumber(String);

impl FromNumber {
    /// JSON field name used by the messages API (`from-number`).
    pub const FIELD: &'static str = "from-number";

    /// Create a validated sender number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to the API.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Ordered list of recipients (`destination`).
///
/// A single recipient converts into a one-element list. Emptiness is checked by
/// [`crate::SendMessage::new`], so conversions here are infallible.
pub struct Destination(Vec<String>);

impl Destination {
    /// JSON field name used by the messages API (`destination`).
    pub const FIELD: &'static str = "destination";

    /// One recipient.
    pub fn one(value: impl Into<String>) -> Self {
        Self(vec![value.into()])
    }

    /// Many recipients, order preserved.
    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Borrow the recipients in the order they will be sent.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if let Some(index) = self.0.iter().position(|it| it.trim().is_empty()) {
            return Err(ValidationError::EmptyDestination { index });
        }
        Ok(())
    }
}

impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        Self::one(value)
    }
}

impl From<String> for Destination {
    fn from(value: String) -> Self {
        Self::one(value)
    }
}

impl From<Vec<String>> for Destination {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for Destination {
    fn from(value: Vec<&str>) -> Self {
        Self::many(value)
    }
}

impl<const N: usize> From<[&str; N]> for Destination {
    fn from(value: [&str; N]) -> Self {
        Self::many(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Server-issued message session identifier.
///
/// Invariant: at least [`SessionId::MIN_LEN`] characters, each ASCII alphanumeric or `_`.
pub struct SessionId(String);

impl SessionId {
    /// Path segment that precedes the id (`messagesessions`).
    pub const SEGMENT: &'static str = "messagesessions";

    /// Minimum accepted length.
    pub const MIN_LEN: usize = 32;

    /// Create a validated [`SessionId`]. The value is not trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let well_formed = value.len() >= Self::MIN_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if !well_formed {
            return Err(ValidationError::InvalidSessionId { input: value });
        }
        Ok(Self(value))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Tenant the request is addressed to.
///
/// `~` ([`Domain::CURRENT`]) resolves to the domain of the authenticated token.
pub struct Domain(String);

impl Domain {
    pub const FIELD: &'static str = "domain";
    pub const CURRENT: &'static str = "~";

    /// Create a validated [`Domain`] (non-empty after trimming).
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The authenticated context's own domain.
    pub fn current() -> Self {
        Self(Self::CURRENT.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::current()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// User (extension/mailbox) inside a [`Domain`].
///
/// `~` ([`User::CURRENT`]) resolves to the user of the authenticated token.
pub struct User(String);

impl User {
    pub const FIELD: &'static str = "user";
    pub const CURRENT: &'static str = "~";

    /// Create a validated [`User`] (non-empty after trimming).
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The authenticated context's own user.
    pub fn current() -> Self {
        Self(Self::CURRENT.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for User {
    fn default() -> Self {
        Self::current()
    }
}
