//! Request context passed to every host call.

use market_commerce::UserId;
use serde::{Deserialize, Serialize};

/// Who is calling and in which channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Authenticated user, if any.
    pub active_user_id: Option<UserId>,
    /// Session token identifying a guest or customer session.
    pub session: Option<String>,
    /// Channel token; `None` means the default channel.
    pub channel_token: Option<String>,
}

impl RequestContext {
    /// An unauthenticated context on the default channel.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context for an authenticated user.
    pub fn for_user(user_id: impl Into<UserId>) -> Self {
        Self {
            active_user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn with_channel_token(mut self, token: impl Into<String>) -> Self {
        self.channel_token = Some(token.into());
        self
    }

    /// Key of the caller's active order: the session, else the user.
    pub fn order_key(&self) -> Option<String> {
        self.session
            .clone()
            .or_else(|| self.active_user_id.as_ref().map(|u| format!("user:{}", u)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key_prefers_session() {
        assert_eq!(RequestContext::anonymous().order_key(), None);
        assert_eq!(RequestContext::for_user("3").order_key().as_deref(), Some("user:3"));
        assert_eq!(
            RequestContext::for_user("3").with_session("s1").order_key().as_deref(),
            Some("s1")
        );
    }
}
