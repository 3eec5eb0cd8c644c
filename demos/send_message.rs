use std::io;
use std::sync::Arc;

use netsapiens_messaging::{
    FromNumber, MessageText, MessageType, MessagingClient, SendMessage, StaticToken,
};

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = required_env("NS_ACCESS_TOKEN")?;
    let api_url = required_env("NS_API_URL")?;
    let to = required_env("NS_TO")?;
    let from = required_env("NS_FROM")?;
    let message = std::env::var("NS_MESSAGE")
        .unwrap_or_else(|_| "Hello from the netsapiens-messaging demo.".to_owned());

    let client = MessagingClient::new(Arc::new(StaticToken::new(token, api_url)));
    let recipients = to.split(',').map(str::trim).collect::<Vec<_>>();
    let request = SendMessage::new(
        MessageType::sms(),
        MessageText::new(message)?,
        recipients,
        FromNumber::new(from)?,
    )?;

    let response = client.send_message(request).await?;
    println!("{response:#}");

    Ok(())
}
