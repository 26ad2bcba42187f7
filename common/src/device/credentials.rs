use std::fmt;

/// Login material shared by every device in a batch. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Elevates the session to privileged mode.
    pub secret: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}
