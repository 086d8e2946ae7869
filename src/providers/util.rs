use crate::core::error::{ProviderError, ProviderErrorKind};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "tradar/0.1";

/// Builds the HTTP client shared by every call of one provider.
pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Issues a single GET and decodes the JSON body into `T`.
///
/// There is no retry here: a failed call is reported once and the caller
/// decides whether to fall back.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    timeout: Duration,
) -> Result<T, ProviderError> {
    debug!("Requesting {} from {}", provider, url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::Status(status.as_u16()),
        ));
    }

    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e, timeout))?;

    serde_json::from_str(&text).map_err(|e| {
        ProviderError::schema(provider, format!("failed to parse JSON response: {e}"))
    })
}
