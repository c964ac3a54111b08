use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity claims asserted by the upstream session provider.
///
/// Every field is optional: the auth layer may know a stored user id, an email,
/// both, or neither. Contains only data, no lookup logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SessionIdentity {
    /// Stored user id the session believes it belongs to. May be stale.
    pub user_id: Option<String>,
    /// Email address, the durable identity key.
    pub email: Option<String>,
    /// Display name to record on the user.
    pub name: Option<String>,
    /// Avatar URL or storage key.
    pub avatar_ref: Option<String>,
}

impl SessionIdentity {
    /// A session carrying neither a user id nor an email is unauthenticated.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.user_id().is_none() && self.email().is_none()
    }

    /// Asserted user id, with blank values treated as absent.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        non_blank(self.user_id.as_deref())
    }

    /// Asserted email, trimmed, with blank values treated as absent.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    #[must_use]
    pub fn avatar_ref(&self) -> Option<&str> {
        non_blank(self.avatar_ref.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_is_anonymous() {
        assert!(SessionIdentity::default().is_anonymous());
    }

    #[test]
    fn blank_fields_count_as_absent() {
        let session = SessionIdentity {
            user_id: Some("  ".into()),
            email: Some(String::new()),
            ..Default::default()
        };
        assert!(session.is_anonymous());
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn email_alone_is_enough() {
        let session = SessionIdentity {
            email: Some(" dev@example.com ".into()),
            ..Default::default()
        };
        assert!(!session.is_anonymous());
        assert_eq!(session.email(), Some("dev@example.com"));
    }
}
