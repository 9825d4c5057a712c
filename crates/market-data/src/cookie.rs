//! Session cookie capture.
//!
//! The host signs sessions with two cookies, `session` and `session.sig`.
//! The storefront re-issues both as first-party cookies.

use serde::{Deserialize, Serialize};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Name of the session signature cookie.
pub const SESSION_SIG_COOKIE: &str = "session.sig";

/// Attributes appended to re-issued cookies.
pub const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; SameSite=Lax";

/// Session cookies found in upstream `set-cookie` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookies {
    pub session: Option<String>,
    pub signature: Option<String>,
}

impl SessionCookies {
    /// Pick the session cookies out of `set-cookie` header values.
    ///
    /// A header may carry several cookies joined by commas; later values win.
    pub fn from_set_cookie<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut cookies = Self::default();
        for header in headers {
            for (name, value) in header.split(',').filter_map(cookie_pair) {
                match name {
                    SESSION_COOKIE => cookies.session = Some(value.to_string()),
                    SESSION_SIG_COOKIE => cookies.signature = Some(value.to_string()),
                    _ => {}
                }
            }
        }
        cookies
    }

    pub fn is_empty(&self) -> bool {
        self.session.is_none() && self.signature.is_none()
    }

    /// Fold newer cookies over these.
    pub fn merge(&mut self, newer: SessionCookies) {
        if newer.session.is_some() {
            self.session = newer.session;
        }
        if newer.signature.is_some() {
            self.signature = newer.signature;
        }
    }

    /// `set-cookie` values for the browser.
    pub fn to_set_cookie_headers(&self) -> Vec<String> {
        let mut headers = Vec::new();
        if let Some(value) = &self.session {
            headers.push(format!("{}={}; {}", SESSION_COOKIE, value, COOKIE_ATTRIBUTES));
        }
        if let Some(value) = &self.signature {
            headers.push(format!("{}={}; {}", SESSION_SIG_COOKIE, value, COOKIE_ATTRIBUTES));
        }
        headers
    }
}

/// `name=value` from the start of a set-cookie segment.
fn cookie_pair(segment: &str) -> Option<(&str, &str)> {
    let first = segment.split(';').next()?.trim();
    let (name, value) = first.split_once('=')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((name.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_both_cookies() {
        let cookies = SessionCookies::from_set_cookie([
            "session=abc123; path=/; expires=Wed, 01 Jan 2031 00:00:00 GMT; httponly",
            "session.sig=xyz; path=/; httponly",
        ]);
        assert_eq!(cookies.session.as_deref(), Some("abc123"));
        assert_eq!(cookies.signature.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_ignores_other_cookies() {
        let cookies = SessionCookies::from_set_cookie(["other=1; path=/", "xsession=2"]);
        assert!(cookies.is_empty());
    }

    #[test]
    fn test_combined_header() {
        let cookies = SessionCookies::from_set_cookie(["session=a; path=/, session.sig=b; path=/"]);
        assert_eq!(cookies.session.as_deref(), Some("a"));
        assert_eq!(cookies.signature.as_deref(), Some("b"));
    }

    #[test]
    fn test_reissue_first_party() {
        let cookies = SessionCookies {
            session: Some("a".to_string()),
            signature: Some("b".to_string()),
        };
        assert_eq!(
            cookies.to_set_cookie_headers(),
            vec![
                "session=a; Path=/; HttpOnly; SameSite=Lax".to_string(),
                "session.sig=b; Path=/; HttpOnly; SameSite=Lax".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge_keeps_latest() {
        let mut cookies = SessionCookies::from_set_cookie(["session=old", "session.sig=s1"]);
        cookies.merge(SessionCookies::from_set_cookie(["session=new"]));
        assert_eq!(cookies.session.as_deref(), Some("new"));
        assert_eq!(cookies.signature.as_deref(), Some("s1"));
    }
}
