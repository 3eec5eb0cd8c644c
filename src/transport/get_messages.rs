use crate::domain::{ListMessages, SessionId, User};

/// Path below `ns-api/v2` for a listing. First match wins:
/// a session id lists that session's messages, a user lists the user's sessions,
/// otherwise every session of the domain is listed.
pub fn get_messages_segments(request: &ListMessages) -> Vec<&str> {
    let domain = request.domain().as_str();
    match (request.session_id(), request.user()) {
        (Some(session_id), user) => vec![
            "domains",
            domain,
            "users",
            user.map_or(User::CURRENT, User::as_str),
            SessionId::SEGMENT,
            session_id.as_str(),
            "messages",
        ],
        (None, Some(user)) => vec!["domains", domain, "users", user.as_str(), SessionId::SEGMENT],
        (None, None) => vec!["domains", domain, SessionId::SEGMENT],
    }
}

pub fn encode_get_messages_query(request: &ListMessages) -> Vec<(String, String)> {
    request
        .limit()
        .map(|limit| ("limit".to_owned(), limit.to_string()))
        .into_iter()
        .collect()
}
