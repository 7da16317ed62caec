//! One-shot user notices carried across the post-redirect-get cycle

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

/// Cookie holding the pending notice until the listing page shows it.
pub const NOTICE_COOKIE: &str = "shelf_notice";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(NoticeLevel::Success),
            "error" => Some(NoticeLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Cookie value in the form `level:percent-encoded-message`.
    pub fn cookie_value(&self) -> String {
        format!(
            "{}:{}",
            self.level.as_str(),
            utf8_percent_encode(&self.message, NON_ALPHANUMERIC)
        )
    }

    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let (level, encoded) = value.split_once(':')?;
        let level = NoticeLevel::parse(level)?;
        let message = percent_decode_str(encoded).decode_utf8().ok()?;

        if message.trim().is_empty() {
            return None;
        }

        Some(Self {
            level,
            message: message.into_owned(),
        })
    }

    pub fn into_cookie(self) -> Cookie<'static> {
        Cookie::build((NOTICE_COOKIE, self.cookie_value()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Takes the pending notice out of the jar. The returned jar clears the
    /// cookie, so the notice is shown once.
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
        let pending = jar
            .get(NOTICE_COOKIE)
            .map(|cookie| Self::from_cookie_value(cookie.value()));

        match pending {
            Some(notice) => (jar.remove(Cookie::build(NOTICE_COOKIE).path("/")), notice),
            None => (jar, None),
        }
    }

    /// Stores the notice in the jar and redirects to the listing page.
    pub fn flash(self, jar: CookieJar) -> FlashRedirect {
        FlashRedirect {
            jar: jar.add(self.into_cookie()),
        }
    }
}

/// `302 Found` to the listing page carrying the notice cookie.
pub struct FlashRedirect {
    jar: CookieJar,
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        (self.jar, (StatusCode::FOUND, [(header::LOCATION, "/")])).into_response()
    }
}
