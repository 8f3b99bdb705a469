//! Fetching background templates.

use std::path::PathBuf;
use std::time::Duration;

use custom_debug::Debug;
use futures::future::BoxFuture;
use futures::FutureExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::canvas::DecodedImage;
use crate::error::AssetError;

/// Where a profile's background template lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundRef {
    Url(#[debug(format = "{}")] Url),
    Path(PathBuf),
}

pub trait BackgroundSource {
    /// Raw bytes of the background. Called at most once per render.
    fn fetch<'a>(
        &'a self,
        background: &'a BackgroundRef,
    ) -> BoxFuture<'a, Result<Vec<u8>, AssetError>>;
}

/// Fetches URLs over HTTP and reads paths from disk.
#[derive(Debug, Clone, Default)]
pub struct DefaultSource {
    client: reqwest::Client,
}

impl DefaultSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl BackgroundSource for DefaultSource {
    fn fetch<'a>(
        &'a self,
        background: &'a BackgroundRef,
    ) -> BoxFuture<'a, Result<Vec<u8>, AssetError>> {
        async move {
            match background {
                BackgroundRef::Url(url) => {
                    let response = self.client.get(url.clone()).send().await?;
                    let status = response.status();
                    if !status.is_success() {
                        return Err(AssetError::Status { status });
                    }
                    Ok(response.bytes().await?.to_vec())
                }
                BackgroundRef::Path(path) => Ok(tokio::fs::read(path).await?),
            }
        }
        .boxed()
    }
}

/// Fetches and decodes a background, giving up after `timeout`.
pub async fn resolve_background<S>(
    source: &S,
    background: &BackgroundRef,
    timeout: Duration,
) -> Result<DecodedImage, AssetError>
where
    S: BackgroundSource + ?Sized,
{
    let bytes = tokio::time::timeout(timeout, source.fetch(background))
        .await
        .map_err(|_| AssetError::Timeout(timeout))??;
    tracing::debug!(bytes = bytes.len(), "fetched background");
    Ok(DecodedImage::decode(&bytes)?)
}
