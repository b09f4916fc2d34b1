use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use common::{Error, HistoryStore, Observation, Result};

/// Observation history in a PostgREST-compatible record store (e.g. Supabase).
///
/// Each observation is one row of `table`; the store adds its own `id` and
/// `created_at` columns, which are used for ordering.
pub struct RestHistoryStore {
    endpoint: Url,
    api_key: String,
    http: Client,
}

impl RestHistoryStore {
    pub fn new(base_url: &Url, api_key: impl Into<String>, table: &str, timeout: Duration) -> Result<Self> {
        let endpoint = format!("{}/rest/v1/{table}", base_url.as_str().trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| Error::Config(format!("invalid record store endpoint '{endpoint}': {e}")))?;
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            http,
        })
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn fetch(&self, query: &[(&str, &str)]) -> Result<Vec<Observation>> {
        let resp = self
            .authed(self.http.get(self.endpoint.clone()))
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let body = checked_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl HistoryStore for RestHistoryStore {
    fn name(&self) -> &str {
        "rest"
    }

    async fn last(&self) -> Result<Option<Observation>> {
        let rows = self
            .fetch(&[("select", "*"), ("order", "created_at.desc"), ("limit", "1")])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn append(&self, observation: &Observation) -> Result<()> {
        let resp = self
            .authed(self.http.post(self.endpoint.clone()))
            .header("Prefer", "return=minimal")
            .json(&[observation])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        checked_body(resp).await?;
        debug!(endpoint = %self.endpoint, "Observation inserted");
        Ok(())
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Observation>> {
        let filter = format!("gte.{}", cutoff.to_rfc3339_opts(SecondsFormat::Millis, true));
        self.fetch(&[
            ("select", "*"),
            ("timestamp", filter.as_str()),
            ("order", "created_at.desc"),
        ])
        .await
    }
}

async fn checked_body(resp: Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
    if !status.is_success() {
        return Err(Error::Http(format!("record store returned HTTP {status}: {body}")));
    }
    Ok(body)
}
