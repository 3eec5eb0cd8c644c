//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod validation;
mod value;

pub use request::{ListMessages, SendMessage, SendOptions};
pub use validation::ValidationError;
pub use value::{
    Destination, Domain, FromNumber, MessageText, MessageType, SessionId, User,
};
