use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use common::{Error, MetricSampler, RawSample, Result};

/// Reads samples from an HTTP endpoint returning one `RawSample` JSON object:
///
/// ```json
/// {"primaryMove": 1.2, "secondaryMove": -0.4, "activityCount": 12, "participationCount": 31}
/// ```
pub struct FeedSampler {
    url: Url,
    token: Option<String>,
    http: Client,
}

impl FeedSampler {
    pub fn new(url: Url, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { url, token, http })
    }
}

#[async_trait]
impl MetricSampler for FeedSampler {
    async fn sample(&self) -> Result<RawSample> {
        let mut req = self.http.get(self.url.clone());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        debug!(url = %self.url, "Fetching sample from feed");
        let resp = req.send().await.map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Http(format!("feed returned HTTP {status}: {body}")));
        }

        Ok(serde_json::from_str(&body)?)
    }
}
