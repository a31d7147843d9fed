use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;

use crate::geo::Coordinates;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("city-scout/0.1")
        .build()
        .expect("failed to build location client")
});

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Best-effort IP geolocation lookup.
pub struct IpLookupProvider {
    endpoint: String,
}

impl IpLookupProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for IpLookupProvider {
    fn default() -> Self {
        Self::new("https://ipapi.co/json/")
    }
}

#[async_trait]
impl LocationProvider for IpLookupProvider {
    async fn current_position(&self) -> Result<Coordinates> {
        let response = CLIENT
            .get(&self.endpoint)
            .send()
            .await
            .with_context(|| format!("position request failed for {}", self.endpoint))?
            .error_for_status()
            .context("position lookup returned non-success status")?;
        response
            .json::<Coordinates>()
            .await
            .context("unable to decode position payload")
    }
}

/// Resolve the user's position once per session: ask the provider, and on
/// error or after `timeout` substitute the fixed fallback coordinate. Never
/// fails, so callers always have a position to filter with.
pub async fn resolve_position(
    provider: &dyn LocationProvider,
    timeout: Duration,
    fallback: Coordinates,
) -> Coordinates {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(Ok(position)) => position,
        Ok(Err(err)) => {
            eprintln!("position lookup failed: {err}");
            fallback
        }
        Err(_) => {
            eprintln!("position lookup timed out after {timeout:?}");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: Coordinates = Coordinates {
        latitude: 40.7128,
        longitude: -74.0060,
    };

    struct FixedProvider(Coordinates);

    #[async_trait]
    impl LocationProvider for FixedProvider {
        async fn current_position(&self) -> Result<Coordinates> {
            Ok(self.0)
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LocationProvider for FailingProvider {
        async fn current_position(&self) -> Result<Coordinates> {
            anyhow::bail!("permission denied")
        }
    }

    struct StalledProvider;

    #[async_trait]
    impl LocationProvider for StalledProvider {
        async fn current_position(&self) -> Result<Coordinates> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(FALLBACK)
        }
    }

    #[tokio::test]
    async fn uses_provider_position_when_available() {
        let here = Coordinates {
            latitude: 40.73,
            longitude: -73.99,
        };
        let got = resolve_position(&FixedProvider(here), Duration::from_secs(3), FALLBACK).await;
        assert_eq!(got, here);
    }

    #[tokio::test]
    async fn falls_back_on_provider_error() {
        let got = resolve_position(&FailingProvider, Duration::from_secs(3), FALLBACK).await;
        assert_eq!(got, FALLBACK);
    }

    #[tokio::test]
    async fn falls_back_on_timeout() {
        let got = resolve_position(&StalledProvider, Duration::from_millis(50), FALLBACK).await;
        assert_eq!(got, FALLBACK);
    }
}
