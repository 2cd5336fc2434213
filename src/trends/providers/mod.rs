// src/trends/providers/mod.rs
pub mod backend;
pub mod bluesky;
pub mod google_rss;
pub mod multi_region;
pub mod neologisms;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::trends::error::ProviderError;
use crate::trends::types::RawItem;

const USER_AGENT: &str = "lingua-viva-trends/0.1";

/// Where a provider reads its payload from. Fixture mode runs the same parser
/// over an in-memory body.
pub(crate) enum Source {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl Source {
    pub(crate) fn http(url: String, client: reqwest::Client) -> Self {
        Source::Http { url, client }
    }

    pub(crate) async fn body(&self, accept: &str) -> Result<String, ProviderError> {
        match self {
            Source::Fixture(s) => Ok(s.clone()),
            Source::Http { url, client } => {
                let resp = client
                    .get(url)
                    .header(reqwest::header::ACCEPT, accept)
                    .send()
                    .await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(ProviderError::Status(status.as_u16()));
                }
                Ok(resp.text().await?)
            }
        }
    }
}

/// Shared HTTP client for upstream providers.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(target: "trends", error = %e, "http client builder failed; using defaults");
            reqwest::Client::new()
        })
}

/// `{success, data}` envelope returned by the trends proxy.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<Vec<T>>,
}

/// Decode a proxy envelope; `success: false` or missing data is `Empty`.
pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ProviderError> {
    let env: Envelope<T> = serde_json::from_str(body)?;
    match env.data {
        Some(data) if env.success && !data.is_empty() => Ok(data),
        _ => Err(ProviderError::Empty),
    }
}

/// Run one provider call under a time budget; elapsing is a soft failure.
pub(crate) async fn query_with_timeout<F>(
    call: F,
    timeout: Duration,
) -> Result<Vec<RawItem>, ProviderError>
where
    F: Future<Output = Result<Vec<RawItem>, ProviderError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(res) => res,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        termo: String,
    }

    #[test]
    fn envelope_success_with_data() {
        let rows: Vec<Row> =
            parse_envelope(r#"{"success": true, "data": [{"termo": "Bué"}]}"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].termo, "Bué");
    }

    #[test]
    fn envelope_failure_shapes_are_empty_or_parse() {
        let r = parse_envelope::<Row>(r#"{"success": false, "error": "Sem dados"}"#);
        assert!(matches!(r, Err(ProviderError::Empty)));
        let r = parse_envelope::<Row>(r#"{"success": true, "data": []}"#);
        assert!(matches!(r, Err(ProviderError::Empty)));
        let r = parse_envelope::<Row>("<html>502 Bad Gateway</html>");
        assert!(matches!(r, Err(ProviderError::Parse(_))));
    }
}
