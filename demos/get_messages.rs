use std::io;
use std::num::NonZeroU32;
use std::sync::Arc;

use netsapiens_messaging::{ListMessages, MessagingClient, SessionId, StaticToken, User};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = std::env::var("NS_ACCESS_TOKEN").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "NS_ACCESS_TOKEN environment variable is required",
        )
    })?;
    let api_url = std::env::var("NS_API_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "NS_API_URL environment variable is required",
        )
    })?;

    let mut request = ListMessages::new().with_limit(NonZeroU32::new(20).ok_or("zero limit")?);
    if let Ok(user) = std::env::var("NS_USER") {
        request = request.with_user(User::new(user)?);
    }
    if let Ok(session) = std::env::var("NS_SESSION") {
        request = request.with_session(SessionId::new(session)?);
    }

    let client = MessagingClient::new(Arc::new(StaticToken::new(token, api_url)));
    let response = client.get_messages(request).await?;
    println!("{response:#}");

    Ok(())
}
