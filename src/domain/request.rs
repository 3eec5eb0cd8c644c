use std::num::NonZeroU32;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use crate::domain::validation::ValidationError;
use crate::domain::value::{
    Destination, Domain, FromNumber, MessageText, MessageType, SessionId, User,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Append to an existing session instead of starting a new one.
    pub session_id: Option<SessionId>,
    /// Base64-encoded media payload (`data`).
    pub data: Option<String>,
    /// Media type of `data` (`mime-type`).
    pub mime_type: Option<String>,
    /// Size of the decoded media in bytes (`size`).
    pub size: Option<u64>,
}

impl SendOptions {
    /// Options that attach raw media bytes: they are base64-encoded and their length is
    /// recorded as `size`.
    pub fn attachment(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            session_id: None,
            data: Some(B64.encode(bytes)),
            mime_type: Some(mime_type.into()),
            size: Some(bytes.len() as u64),
        }
    }

    /// Same options, addressed to `session_id`.
    pub fn in_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    message_type: MessageType,
    message: MessageText,
    destination: Destination,
    from_number: FromNumber,
    options: SendOptions,
}

impl SendMessage {
    pub fn new(
        message_type: MessageType,
        message: MessageText,
        destination: impl Into<Destination>,
        from_number: FromNumber,
    ) -> Result<Self, ValidationError> {
        let destination = destination.into();
        destination.validate()?;
        Ok(Self {
            message_type,
            message,
            destination,
            from_number,
            options: SendOptions::default(),
        })
    }

    pub fn with_options(mut self, options: SendOptions) -> Self {
        self.options = options;
        self
    }

    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn from_number(&self) -> &FromNumber {
        &self.from_number
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }
}

/// Listing request: sessions of a domain, sessions of a user, or the messages of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMessages {
    session_id: Option<SessionId>,
    domain: Domain,
    user: Option<User>,
    limit: Option<NonZeroU32>,
}

impl ListMessages {
    /// All sessions of the current domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of one session.
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Cap the number of returned items (`limit` query parameter).
    pub fn with_limit(mut self, limit: NonZeroU32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn limit(&self) -> Option<NonZeroU32> {
        self.limit
    }
}
