use anyhow::{Context, Result};
use depot_core::api::{DeleteResponse, FileEntry, ListResponse, UploadResponse};
use futures::StreamExt;
use reqwest::Url;
use std::path::Path;
use tokio::io::AsyncWriteExt;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid server URL")?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("failed to build API URL")
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }
        Ok(response)
    }

    pub async fn upload(&self, name: &str, data: Vec<u8>) -> Result<UploadResponse> {
        let url = self.url("/api/upload")?;
        let response = self
            .authorize(self.http.post(url))
            .header("X-Filename", name)
            .header("Content-Type", "application/octet-stream")
            .body(data)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Download a file, streaming chunks straight to `dest`.
    pub async fn download_to(&self, name: &str, dest: &Path) -> Result<u64> {
        let url = self.url(&format!("/api/download/{name}"))?;
        let response = self.authorize(self.http.get(url)).send().await?;
        let response = Self::check(response).await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("failed to create {}", dest.display()))?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    pub async fn list(&self) -> Result<Vec<FileEntry>> {
        let url = self.url("/api/files")?;
        let response = self.authorize(self.http.get(url)).send().await?;
        let listing: ListResponse = Self::check(response).await?.json().await?;
        Ok(listing.files)
    }

    pub async fn delete(&self, name: &str) -> Result<DeleteResponse> {
        let url = self.url(&format!("/api/files/{name}"))?;
        let response = self.authorize(self.http.delete(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn info(&self, name: &str) -> Result<FileEntry> {
        let url = self.url(&format!("/api/info/{name}"))?;
        let response = self.authorize(self.http.get(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        let url = self.url("/api/health")?;
        let response = self.authorize(self.http.get(url)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
