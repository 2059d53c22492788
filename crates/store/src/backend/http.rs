//! Remote object-store snapshot backend

use super::{object_name, Backend};
use crate::error::BackendError;
use quill_core::Document;
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// One JSON object per entity on an S3-style HTTP endpoint.
///
/// Atomicity of `save` relies on the remote store's native atomic object PUT:
/// a concurrent GET observes either the previous object or the new one, never
/// a partial body.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    /// Create a backend for a bucket/prefix URL, e.g.
    /// `https://objects.internal/characters`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn object_url(&self, entity: &str) -> String {
        format!("{}/{}", self.base_url, object_name(entity))
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl Backend for HttpBackend {
    fn load(&self, entity: &str) -> Result<Option<Document>, BackendError> {
        let response = self
            .authorize(self.client.get(self.object_url(entity)))
            .send()?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json()?)),
            status => Err(BackendError::Status(status)),
        }
    }

    fn save(&self, entity: &str, doc: &Document) -> Result<(), BackendError> {
        let response = self
            .authorize(self.client.put(self.object_url(entity)))
            .json(doc)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_shape() {
        let backend = HttpBackend::new("https://objects.internal/characters/");
        assert_eq!(
            backend.object_url("char-1"),
            "https://objects.internal/characters/636861722d31.json"
        );
    }
}
