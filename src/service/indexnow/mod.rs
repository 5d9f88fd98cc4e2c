use serde_json::json;

use crate::config::IndexNowConfig;

const INDEXNOW_URL: &str = "https://api.indexnow.org/indexnow";

/// Forwards freshly published URLs to the IndexNow endpoint. The key and
/// host are server config; clients only ever supply the URL to submit.
#[derive(Debug, Clone)]
pub struct IndexNow {
    client: reqwest::Client,
    key: Option<String>,
    host: Option<String>,
}

impl IndexNow {
    pub fn from_config(config: &IndexNowConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            key: config.key.clone(),
            host: config.host.clone(),
        }
    }

    /// Best-effort submission; reports whether the upstream accepted it.
    pub async fn submit(&self, url: &str) -> bool {
        let (Some(key), Some(host)) = (&self.key, &self.host) else {
            tracing::warn!("indexnow key or host not configured, skipping ping");
            return false;
        };

        let payload = json!({
            "host": host,
            "key": key,
            "urlList": [url],
        });

        match self.client.post(INDEXNOW_URL).json(&payload).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::warn!(%error, "indexnow ping failed");
                false
            }
        }
    }
}
