use serde::Serialize;

use crate::domain::{Domain, SendMessage, SessionId, User};

#[derive(Debug, Serialize)]
struct SendMessageJson<'a> {
    #[serde(rename = "type")]
    message_type: &'a str,
    message: &'a str,
    destination: &'a [String],
    #[serde(rename = "from-number")]
    from_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a str>,
    #[serde(rename = "mime-type", skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<String>,
}

/// Path below `ns-api/v2` for a send: the session's `messages` collection when the
/// request carries a session id, the user's `messages` collection otherwise.
pub fn send_message_segments<'a>(
    domain: &'a Domain,
    user: &'a User,
    request: &'a SendMessage,
) -> Vec<&'a str> {
    let mut segments = vec!["domains", domain.as_str(), "users", user.as_str()];
    if let Some(session_id) = request.options().session_id.as_ref() {
        segments.push(SessionId::SEGMENT);
        segments.push(session_id.as_str());
    }
    segments.push("messages");
    segments
}

/// Encode the JSON body. Keys keep the wire order; empty media fields and a zero
/// size are left out.
pub fn encode_send_message_json(request: &SendMessage) -> Result<String, serde_json::Error> {
    let options = request.options();
    let payload = SendMessageJson {
        message_type: request.message_type().as_str(),
        message: request.message().as_str(),
        destination: request.destination().as_slice(),
        from_number: request.from_number().as_str(),
        data: options.data.as_deref().filter(|it| !it.is_empty()),
        mime_type: options.mime_type.as_deref().filter(|it| !it.is_empty()),
        size: options.size.filter(|it| *it > 0).map(|it| it.to_string()),
    };
    serde_json::to_string(&payload)
}
