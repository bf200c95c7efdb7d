//! Authenticated-user gate backed by an external identity provider
//!
//! The session is a plain value: build it with [`SessionContext::init`], pass it to
//! whatever needs the current user, and clear it with [`SessionContext::logout`].

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Profile of the signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Body of the provider's "who am I" endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[async_trait]
pub trait IdentityProvider {
    /// The signed-in user, or `None` when the session is anonymous
    async fn current_user(&self) -> Result<Option<User>, SessionError>;

    async fn logout(&self) -> Result<(), SessionError>;

    /// Where a browser is sent to sign in
    fn login_url(&self) -> String;
}

/// Identity provider reached over the session server's JSON API
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(base_url: impl Into<String>, session_cookie: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_cookie,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        request
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_user(&self) -> Result<Option<User>, SessionError> {
        let response = self.request(reqwest::Method::GET, "/api/user").send().await?;

        // An anonymous session answers 401 with `{"authenticated": false}`
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let body: UserResponse = response.error_for_status()?.json().await?;
        Ok(if body.authenticated { body.user } else { None })
    }

    async fn logout(&self) -> Result<(), SessionError> {
        self.request(reqwest::Method::POST, "/api/logout")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn login_url(&self) -> String {
        format!("{}/auth/login", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AuthState {
    Anonymous,
    Authenticated(User),
}

/// Who is using the calendar, if anyone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    state: AuthState,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self {
            state: AuthState::Anonymous,
        }
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            state: AuthState::Authenticated(user),
        }
    }

    /// Asks the provider for the current session
    ///
    /// Provider failures are logged and treated as "not signed in".
    pub async fn init<P: IdentityProvider + ?Sized>(provider: &P) -> Self {
        match provider.current_user().await {
            Ok(Some(user)) => {
                info!("Signed in as {}", user.display_name);
                Self::authenticated(user)
            }
            Ok(None) => {
                info!("No active session");
                Self::anonymous()
            }
            Err(err) => {
                warn!("Session lookup failed: {}", err);
                Self::anonymous()
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            AuthState::Anonymous => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.user().map(|u| u.display_name.as_str())
    }

    /// The signed-in user, or `SessionError::Unauthenticated`
    pub fn require_user(&self) -> Result<&User, SessionError> {
        self.user().ok_or(SessionError::Unauthenticated)
    }

    /// Ends the session at the provider, then forgets the user
    ///
    /// If the provider call fails the local session is kept.
    pub async fn logout<P: IdentityProvider + ?Sized>(
        &mut self,
        provider: &P,
    ) -> Result<(), SessionError> {
        provider.logout().await?;
        self.state = AuthState::Anonymous;
        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubProvider {
        user: Option<User>,
        fail_lookup: bool,
        fail_logout: bool,
        logged_out: AtomicBool,
    }

    impl StubProvider {
        fn new(user: Option<User>) -> Self {
            Self {
                user,
                fail_lookup: false,
                fail_logout: false,
                logged_out: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn current_user(&self) -> Result<Option<User>, SessionError> {
            if self.fail_lookup {
                return Err(SessionError::Provider("connection refused".into()));
            }
            Ok(self.user.clone())
        }

        async fn logout(&self) -> Result<(), SessionError> {
            if self.fail_logout {
                return Err(SessionError::Provider("503".into()));
            }
            self.logged_out.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn login_url(&self) -> String {
            "http://idp.test/login".into()
        }
    }

    fn alice() -> User {
        User {
            user_id: "U1".into(),
            display_name: "Alice".into(),
            picture_url: None,
            status_message: None,
        }
    }

    #[tokio::test]
    async fn init_picks_up_signed_in_user() {
        let session = SessionContext::init(&StubProvider::new(Some(alice()))).await;
        assert!(session.is_authenticated());
        assert_eq!(session.display_name(), Some("Alice"));
        assert!(session.require_user().is_ok());
    }

    #[tokio::test]
    async fn init_failure_is_anonymous() {
        let mut provider = StubProvider::new(Some(alice()));
        provider.fail_lookup = true;

        let session = SessionContext::init(&provider).await;
        assert!(!session.is_authenticated());
        assert!(matches!(
            session.require_user(),
            Err(SessionError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn logout_clears_user() {
        let provider = StubProvider::new(Some(alice()));
        let mut session = SessionContext::init(&provider).await;

        session.logout(&provider).await.unwrap();
        assert!(provider.logged_out.load(Ordering::SeqCst));
        assert_eq!(session, SessionContext::anonymous());
    }

    #[tokio::test]
    async fn failed_logout_keeps_user() {
        let mut provider = StubProvider::new(Some(alice()));
        provider.fail_logout = true;
        let mut session = SessionContext::authenticated(alice());

        assert!(session.logout(&provider).await.is_err());
        assert_eq!(session.display_name(), Some("Alice"));
    }

    #[test]
    fn user_response_accepts_missing_user() {
        let body: UserResponse = serde_json::from_str(r#"{"authenticated": false}"#).unwrap();
        assert!(!body.authenticated);
        assert!(body.user.is_none());
    }
}
