use std::time::Duration;

use reqwest::{
    blocking::{
        Client,
        Response,
    },
    header::USER_AGENT,
};

use crate::core::{
    settings::Settings,
    LexitherasError,
};

/// Anything that can hand back the body of a page by URL.
pub trait PageSource {
    fn get_text(&self, url: &str) -> Result<String, LexitherasError>;
}

pub fn http_client(settings: &Settings) -> Result<Client, LexitherasError> {
    Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .map_err(|e| LexitherasError::Custom(format!("HTTP client build failed: {e}")))
}

/// Blocking reqwest-backed page source. One request per call, no retries.
pub struct HttpPageSource {
    client: Client,
    user_agent: String,
}

impl HttpPageSource {
    pub fn new(settings: &Settings) -> Result<Self, LexitherasError> {
        Ok(Self { client: http_client(settings)?, user_agent: settings.user_agent.clone() })
    }
}

impl PageSource for HttpPageSource {
    fn get_text(&self, url: &str) -> Result<String, LexitherasError> {
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|e| LexitherasError::Transport(format!("Failed HTTP GET {}: {}", url, e)))?;

        ensure_success(&resp)?;

        resp.text().map_err(|e| {
            LexitherasError::Transport(format!("Failed to read response body from {}: {}", url, e))
        })
    }
}

fn ensure_success(resp: &Response) -> Result<(), LexitherasError> {
    if !resp.status().is_success() {
        return Err(LexitherasError::Transport(format!(
            "HTTP error {} from {}",
            resp.status(),
            resp.url()
        )));
    }
    Ok(())
}
