//! One-shot user messages carried across a redirect in a cookie.
//!
//! The cookie holds the JSON list of messages, base64url encoded. Pages read
//! and clear it; a value that does not decode is dropped silently.

use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::domain::actions::{ActionOutcome, FlashMessage};

pub const FLASH_COOKIE: &str = "messages";

pub fn encode(messages: &[FlashMessage]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }
    let json = serde_json::to_vec(messages).ok()?;
    Some(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Pending messages plus a jar that clears them.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    let Some(messages) = jar.get(FLASH_COOKIE).map(|c| decode(c.value())) else {
        return (jar, Vec::new());
    };
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

/// Queue messages for the next page, keeping any not yet shown.
pub fn push(jar: CookieJar, messages: Vec<FlashMessage>) -> CookieJar {
    if messages.is_empty() {
        return jar;
    }
    let mut pending = jar
        .get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default();
    pending.extend(messages);

    match encode(&pending) {
        Some(value) => jar.add(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        ),
        None => jar,
    }
}

pub fn redirect(jar: CookieJar, outcome: ActionOutcome) -> (CookieJar, Redirect) {
    let jar = push(jar, outcome.messages);
    (jar, Redirect::to(&outcome.location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_messages_decode_back() {
        let messages = vec![
            FlashMessage::error("amount: Amount must be greater than zero."),
            FlashMessage::success("Account created! Please login."),
        ];
        let value = encode(&messages).unwrap();
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode(&value), messages);
    }

    #[test]
    fn garbage_cookie_yields_nothing() {
        assert!(decode("%%%").is_empty());
        assert!(decode(&URL_SAFE_NO_PAD.encode(b"not json")).is_empty());
        assert_eq!(encode(&[]), None);
    }

    #[test]
    fn push_appends_to_pending_messages() {
        let jar = push(CookieJar::new(), vec![FlashMessage::error("first")]);
        let jar = push(jar, vec![FlashMessage::error("second")]);
        let (_, messages) = take(jar);
        let texts: Vec<_> = messages.into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
