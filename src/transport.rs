//! Cookie transport: reading the inbound session cookie and emitting the
//! outbound one

use salvo_core::http::cookie::{self, Cookie};
use salvo_core::{Request, Response};

use crate::config::SameSite;
use crate::session::SessionOptions;

/// Something that can look up inbound cookies by name
pub trait CookieSource {
    /// Raw cookie value, if present
    fn get_cookie(&self, name: &str) -> Option<String>;
}

/// Something that can emit outbound cookies
pub trait CookieSink {
    /// Queue a cookie on the response
    fn set_cookie(&mut self, cookie: OutgoingCookie);
}

/// A cookie the store wants the transport to set
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingCookie {
    pub name: String,
    /// Signed token; empty for a deletion cookie
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    /// `<= 0` tells the client to drop the cookie
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl OutgoingCookie {
    /// Cookie carrying `value` with the session's options
    pub fn new(name: &str, value: String, options: &SessionOptions) -> Self {
        Self {
            name: name.to_string(),
            value,
            path: options.path.clone(),
            domain: options.domain.clone(),
            max_age: options.max_age,
            secure: options.secure,
            http_only: options.http_only,
            same_site: options.same_site,
        }
    }

    /// Empty cookie that expires immediately
    pub fn removal(name: &str, options: &SessionOptions) -> Self {
        Self {
            max_age: -1,
            ..Self::new(name, String::new(), options)
        }
    }

    /// Whether this cookie deletes the client's copy
    pub fn is_removal(&self) -> bool {
        self.max_age <= 0
    }

    /// Convert into a `cookie::Cookie` for the HTTP layer
    pub fn into_cookie(self) -> Cookie<'static> {
        let max_age = if self.is_removal() {
            cookie::time::Duration::ZERO
        } else {
            cookie::time::Duration::seconds(self.max_age)
        };

        let mut cookie_builder = Cookie::build((self.name, self.value))
            .path(self.path)
            .max_age(max_age)
            .http_only(self.http_only)
            .secure(self.secure);

        if let Some(domain) = self.domain {
            cookie_builder = cookie_builder.domain(domain);
        }

        cookie_builder = match self.same_site {
            SameSite::Strict => cookie_builder.same_site(cookie::SameSite::Strict),
            SameSite::Lax => cookie_builder.same_site(cookie::SameSite::Lax),
            SameSite::None => cookie_builder.same_site(cookie::SameSite::None),
        };

        cookie_builder.build()
    }
}

impl CookieSource for Request {
    fn get_cookie(&self, name: &str) -> Option<String> {
        let raw = self.cookie(name)?.value();
        // Cookies may arrive URL encoded
        match urlencoding::decode(raw) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(_) => Some(raw.to_string()),
        }
    }
}

impl CookieSink for Response {
    fn set_cookie(&mut self, cookie: OutgoingCookie) {
        self.add_cookie(cookie.into_cookie());
    }
}
