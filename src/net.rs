use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::error::DumpError;

const USER_AGENT: &str = concat!("okc_backup/", env!("CARGO_PKG_VERSION"));

/// One authenticated round trip: GET when `form` is None, otherwise a
/// form-encoded POST. Session cookies persist across calls.
pub trait Transport {
    fn open(&self, url: &str, form: Option<&[(&str, &str)]>) -> Result<Vec<u8>, DumpError>;
}

/// Blocking HTTP session with a cookie jar and redirect following.
/// The login cookie set by the site lives here for the whole run.
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpSession {
    fn open(&self, url: &str, form: Option<&[(&str, &str)]>) -> Result<Vec<u8>, DumpError> {
        let request = match form {
            Some(fields) => self.client.post(url).form(fields),
            None => self.client.get(url),
        };
        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| DumpError::transport(url, e))?;
        let bytes = response.bytes().map_err(|e| DumpError::transport(url, e))?;
        Ok(bytes.to_vec())
    }
}
