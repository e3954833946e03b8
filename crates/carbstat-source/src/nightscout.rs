//! Nightscout treatments API client
//!
//! Queries `<base>/api/v1/treatments` for a window widened by one day before
//! and two days after, so that records near midnight arrive regardless of
//! the server's offset. Exact day filtering happens locally.

use async_trait::async_trait;
use carbstat_core::error::{CarbstatError, Result};
use carbstat_core::source::TreatmentSource;
use carbstat_core::types::{DateWindow, RawTreatment};
use reqwest::Url;
use tracing::{debug, info};

/// Path of the treatments endpoint, relative to the site root
const TREATMENTS_PATH: &str = "api/v1/treatments";

/// Nightscout returns 10 documents unless told otherwise
pub const DEFAULT_COUNT: usize = 10_000;

/// Fetches treatments from a Nightscout site
pub struct NightscoutClient {
    /// Site root, e.g. `https://my-site.herokuapp.com`
    base_url: String,
    /// Optional access token
    token: Option<String>,
    /// Maximum number of documents requested
    count: usize,
    /// HTTP client
    client: reqwest::Client,
}

impl NightscoutClient {
    /// Create a new client for a site root
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            count: DEFAULT_COUNT,
            client: reqwest::Client::new(),
        }
    }

    /// Authenticate with an access token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Set the document cap
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Build the query URL for a window
    pub fn treatments_url(&self, window: &DateWindow) -> Result<Url> {
        let root = format!("{}/", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&root)
            .and_then(|base| base.join(TREATMENTS_PATH))
            .map_err(|e| {
                CarbstatError::Config(format!("Invalid Nightscout URL '{}': {}", self.base_url, e))
            })?;

        let (gte, lte) = window.query_bounds();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("find[created_at][$gte]", &gte.format("%Y-%m-%d").to_string());
            query.append_pair("find[created_at][$lte]", &lte.format("%Y-%m-%d").to_string());
            query.append_pair("count", &self.count.to_string());
            if let Some(ref token) = self.token {
                query.append_pair("token", token);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl TreatmentSource for NightscoutClient {
    async fn fetch(&self, window: &DateWindow) -> Result<Vec<RawTreatment>> {
        let url = self.treatments_url(window)?;
        let (gte, lte) = window.query_bounds();
        debug!(
            "Requesting treatments from {} between {} and {}",
            self.base_url, gte, lte
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Nightscout responded with status {}", status);

        if !status.is_success() {
            return Err(CarbstatError::Http {
                status: status.as_u16(),
                url: self.describe(),
            });
        }

        let treatments: Vec<RawTreatment> = response.json().await?;
        info!("Fetched {} treatments from Nightscout", treatments.len());
        Ok(treatments)
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), TREATMENTS_PATH)
    }
}
