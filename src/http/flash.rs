//! One-shot flash messages.
//!
//! A flash survives exactly one redirect: mutating form routes set it on a
//! cookie, and the next page render consumes and clears it. The cookie
//! value is base64url so message text never fights cookie syntax.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

const FLASH_COOKIE: &str = "todo_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashLevel::Success),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

/// A one-shot user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Attach a flash to the outgoing response.
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    let value = URL_SAFE_NO_PAD.encode(format!("{}\t{}", flash.level.as_str(), flash.message));
    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .build();
    jar.add(cookie)
}

/// Consume the pending flash, if any, clearing the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = decode(cookie.value());

    let removal = Cookie::build((FLASH_COOKIE, "")).path("/").build();
    (jar.remove(removal), flash)
}

fn decode(value: &str) -> Option<Flash> {
    let raw = URL_SAFE_NO_PAD.decode(value).ok()?;
    let text = String::from_utf8(raw).ok()?;
    let (level, message) = text.split_once('\t')?;
    Some(Flash {
        level: FlashLevel::parse(level)?,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_take_roundtrips() {
        let jar = CookieJar::default();
        let jar = set(jar, Flash::success("Task added successfully!"));

        let (jar, flash) = take(jar);
        assert_eq!(flash, Some(Flash::success("Task added successfully!")));

        // The taking jar carries the removal; a second take finds nothing.
        let (_, again) = take(jar);
        assert_eq!(again, None);
    }

    #[test]
    fn garbage_cookie_decodes_to_none() {
        assert_eq!(decode("not!base64"), None);
        assert_eq!(decode(&URL_SAFE_NO_PAD.encode("noseparator")), None);
        assert_eq!(decode(&URL_SAFE_NO_PAD.encode("bogus\tmessage")), None);
    }
}
