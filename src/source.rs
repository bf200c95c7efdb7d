use async_trait::async_trait;
use log::debug;

use crate::error::FetchError;

/// Where roster bodies come from
#[async_trait]
pub trait RosterSource {
    /// Fetches the raw JSON body of the current month's roster
    async fn fetch_roster(&self) -> Result<Vec<u8>, FetchError>;
}

/// Roster source reached over HTTP GET
pub struct HttpRosterSource {
    client: reqwest::Client,
    url: String,
    session_cookie: Option<String>,
}

impl HttpRosterSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            session_cookie: None,
        }
    }

    /// Forwards an opaque session cookie with every request
    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RosterSource for HttpRosterSource {
    async fn fetch_roster(&self) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching roster from {}", self.url);

        let mut request = self.client.get(&self.url);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
