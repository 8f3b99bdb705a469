//! Getting finished cards out: PNG encoding, files, and image hosting.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::canvas::RasterSurface;
use crate::error::{ExportError, UploadError};

pub const POSTIMAGES_ENDPOINT: &str = "https://postimages.org/json/rr";
pub const POSTIMAGES_TOKEN_URL: &str = "https://postimages.org/";

pub const UPLOAD_FILE_NAME: &str = "news-card.png";

pub fn encode_png(surface: &RasterSurface) -> Result<Vec<u8>, ExportError> {
    let mut png = Vec::new();
    surface.write_png(&mut png)?;
    Ok(png)
}

/// Writes PNG bytes to `path`, creating parent directories as needed.
pub fn save_png(png: &[u8], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, png)?;
    Ok(())
}

/// Uploads to postimages.org's anonymous endpoint.
#[derive(Debug, Clone)]
pub struct PostImagesUploader {
    client: reqwest::Client,
    endpoint: Url,
    token_url: Url,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

impl PostImagesUploader {
    pub fn new(client: reqwest::Client, endpoint: Url, token_url: Url) -> Self {
        Self {
            client,
            endpoint,
            token_url,
        }
    }

    /// Scrapes the upload token from the landing page, `"default"` if that
    /// fails.
    async fn token(&self) -> String {
        let page = match self.client.get(self.token_url.clone()).send().await {
            Ok(response) => response.text().await,
            Err(err) => Err(err),
        };
        match page {
            Ok(html) => extract_token(&html).unwrap_or_else(|| {
                tracing::warn!("could not find upload token, using default");
                "default".to_string()
            }),
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch upload token, using default");
                "default".to_string()
            }
        }
    }

    pub async fn upload(&self, png: Vec<u8>) -> Result<Url, UploadError> {
        let token = self.token().await;
        let session_upload = chrono::Utc::now().timestamp_millis().to_string();

        let file = reqwest::multipart::Part::bytes(png)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("token", token)
            .text("expire", "0")
            .text("numfiles", "1")
            .text("optsize", "0")
            .text("session_upload", session_upload)
            .text("upload_referer", "aHR0cHM6Ly9wb3N0aW1nLmNjLw==")
            .text("upload_session", "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX")
            .text("adult", "0");

        let response: UploadResponse = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_upload_url(response)
    }
}

fn parse_upload_url(response: UploadResponse) -> Result<Url, UploadError> {
    let url = response.url.ok_or(UploadError::MissingUrl)?;
    Ok(Url::parse(&url)?)
}

/// Finds `"token", "<word>"` (either quote style) in the landing page.
fn extract_token(html: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let key = format!("{quote}token{quote}");
        let mut rest = html;
        while let Some(found) = rest.find(&key) {
            rest = &rest[found + key.len()..];
            if let Some(token) = token_after_key(rest) {
                return Some(token.to_string());
            }
        }
    }
    None
}

fn token_after_key(rest: &str) -> Option<&str> {
    let rest = rest.trim_start().strip_prefix(',')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let end = value.find(quote)?;
    let token = &value[..end];
    let is_word = !token.is_empty() && token.chars().all(|c| c.is_alphanumeric() || c == '_');
    is_word.then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_in_script() {
        let html = r#"<script>PF.obj.config.auth_token = x; set("token", "a1B2_c3");</script>"#;
        assert_eq!(extract_token(html).as_deref(), Some("a1B2_c3"));
    }

    #[test]
    fn finds_single_quoted_token() {
        let html = "init('token' ,  'deadbeef')";
        assert_eq!(extract_token(html).as_deref(), Some("deadbeef"));
    }

    #[test]
    fn skips_non_word_tokens() {
        assert_eq!(extract_token(r#""token": "abc""#), None);
        assert_eq!(extract_token(r#""token", "a b" "token", "ok""#).as_deref(), Some("ok"));
        assert_eq!(extract_token("<html></html>"), None);
    }

    #[test]
    fn upload_response_needs_url() {
        let missing: UploadResponse = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert!(matches!(parse_upload_url(missing), Err(UploadError::MissingUrl)));

        let bad: UploadResponse = serde_json::from_str(r#"{"url": "not a url"}"#).unwrap();
        assert!(matches!(parse_upload_url(bad), Err(UploadError::InvalidUrl(_))));

        let ok: UploadResponse =
            serde_json::from_str(r#"{"url": "https://postimg.cc/abc123"}"#).unwrap();
        assert_eq!(parse_upload_url(ok).unwrap().as_str(), "https://postimg.cc/abc123");
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("newscard-export-{}", std::process::id()));
        let path = dir.join("nested").join("card.png");
        save_png(b"png", &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn encodes_png_signature() {
        let canvas = crate::canvas::CairoCanvas::new(4, 4).unwrap();
        let png = encode_png(&canvas.finish()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
