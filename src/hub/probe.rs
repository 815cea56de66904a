use anyhow::{Context, Result};
use futures_util::future::{BoxFuture, FutureExt};

use crate::error::ProbeError;
use crate::state::Settings;

/// Lightweight out-of-band check that an asset is reachable.
pub trait ExistenceProbe: Send + Sync {
    fn check(&self, asset_ref: &str) -> BoxFuture<'static, Result<(), ProbeError>>;
}

/// HEAD request against the asset locator. No body is transferred.
pub struct HttpProbe {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpProbe {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.probe_timeout())
            .build()
            .context("Failed to build HTTP client for existence probe")?;

        Ok(Self {
            client,
            user_agent: settings.user_agent.clone(),
        })
    }
}

impl ExistenceProbe for HttpProbe {
    fn check(&self, asset_ref: &str) -> BoxFuture<'static, Result<(), ProbeError>> {
        let request = self.client
            .head(asset_ref)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str());
        let url = asset_ref.to_string();

        async move {
            let resp = request.send().await.map_err(|e| {
                tracing::debug!("HEAD {} failed: {}", url, e);
                ProbeError::from(e)
            })?;

            let status = resp.status();
            if status.is_success() || status.is_redirection() {
                tracing::debug!("HEAD {} -> {}", url, status);
                Ok(())
            } else {
                Err(ProbeError::Status(status.as_u16()))
            }
        }
        .boxed()
    }
}
