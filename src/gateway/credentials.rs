/// Supplies the caller identity and bearer credential attached to gateway
/// requests.
///
/// Injected at client construction so tests can substitute fixed or absent
/// credentials; the token is opaque here and never parsed or displayed.
pub trait CredentialSource: Send + Sync {
    /// Caller identity for the `X-User` header, when known.
    fn user(&self) -> Option<String>;

    /// Bearer credential, when a session exists.
    fn token(&self) -> Option<String>;
}

/// Fixed credentials captured at startup (from config or environment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCredentials {
    pub user: Option<String>,
    pub token: Option<String>,
}

impl StaticCredentials {
    pub fn new(user: Option<String>, token: Option<String>) -> Self {
        Self { user, token }
    }

    /// No identity, no credential. Requests go out bare; authorization
    /// failures then surface as non-success responses from the store.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialSource for StaticCredentials {
    fn user(&self) -> Option<String> {
        self.user.clone()
    }

    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}
