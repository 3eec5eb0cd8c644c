//! Typed async Rust client for the NetSapiens v2 messaging API.
//!
//! The crate is split into a domain layer of validated types, a transport layer for the
//! URL layout and wire format, and a small client layer that resolves credentials through
//! an [`AuthProvider`] and issues exactly one HTTP request per call.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use netsapiens_messaging::{
//!     FromNumber, MessageText, MessageType, MessagingClient, SendMessage, StaticToken,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netsapiens_messaging::MessagingError> {
//!     let auth = Arc::new(StaticToken::new("...", "https://api.example.com"));
//!     let client = MessagingClient::new(auth);
//!     let request = SendMessage::new(
//!         MessageType::sms(),
//!         MessageText::new("hello")?,
//!         "+15551234567",
//!         FromNumber::new("+15550001111")?,
//!     )?;
//!     let _resp = client.send_message(request).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod domain;
mod transport;

pub use auth::{AuthProvider, BoxError, BoxFuture, SecretString, StaticToken, TokenData};
pub use client::{MessagingClient, MessagingClientBuilder, MessagingError};
pub use domain::{
    Destination, Domain, FromNumber, ListMessages, MessageText, MessageType, SendMessage,
    SendOptions, SessionId, User, ValidationError,
};
