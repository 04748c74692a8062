use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::ResourceClient;
use crate::error::ResourceError;
use crate::resource::Resource;

/// Resource client for a REST backend exposing `/{collection}` and
/// `/{collection}/{id}` (see [`crate::server::router`]).
pub struct HttpClient<M> {
    base_url: String,
    http: reqwest::Client,
    _marker: PhantomData<fn() -> M>,
}

impl<M> Clone for HttpClient<M> {
    fn clone(&self) -> Self {
        HttpClient {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M: Resource> HttpClient<M> {
    /// `base_url` without the collection segment, e.g. `"http://127.0.0.1:3000"`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        HttpClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            _marker: PhantomData,
        }
    }

    fn collection_url(&self) -> Result<Url, ResourceError> {
        self.url(&[M::COLLECTION])
    }

    /// Ids are pushed as one percent-encoded segment, so `/` or `?` in an id
    /// never changes the route.
    fn record_url(&self, id: &str) -> Result<Url, ResourceError> {
        self.url(&[M::COLLECTION, id])
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ResourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ResourceError::Transport(format!("invalid base url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ResourceError::Transport(format!("base url {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
        id: Option<&str>,
    ) -> Result<T, ResourceError> {
        let response = Self::check(response, id).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ResourceError::invalid_payload(M::COLLECTION, e))
    }

    async fn check(response: Response, id: Option<&str>) -> Result<Response, ResourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string());

        Err(match status {
            StatusCode::NOT_FOUND => ResourceError::not_found(M::COLLECTION, id.unwrap_or_default()),
            StatusCode::UNPROCESSABLE_ENTITY => ResourceError::invalid_payload(M::COLLECTION, message),
            _ => ResourceError::Transport(format!("{}: {}", status, message)),
        })
    }
}

fn transport(err: reqwest::Error) -> ResourceError {
    ResourceError::Transport(err.to_string())
}

#[async_trait]
impl<M: Resource> ResourceClient<M> for HttpClient<M> {
    async fn list(&self) -> Result<Vec<M>, ResourceError> {
        debug!(collection = M::COLLECTION, "GET list");
        let response = self
            .http
            .get(self.collection_url()?)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response, None).await
    }

    async fn get(&self, id: &str) -> Result<M, ResourceError> {
        debug!(collection = M::COLLECTION, %id, "GET record");
        let response = self
            .http
            .get(self.record_url(id)?)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response, Some(id)).await
    }

    async fn create<D>(&self, fields: &D) -> Result<M, ResourceError>
    where
        D: Serialize + Send + Sync + ?Sized,
    {
        debug!(collection = M::COLLECTION, "POST record");
        let response = self
            .http
            .post(self.collection_url()?)
            .json(fields)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response, None).await
    }

    async fn update<P>(&self, id: &str, patch: &P) -> Result<M, ResourceError>
    where
        P: Serialize + Send + Sync + ?Sized,
    {
        debug!(collection = M::COLLECTION, %id, "PATCH record");
        let response = self
            .http
            .patch(self.record_url(id)?)
            .json(patch)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response, Some(id)).await
    }

    async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        debug!(collection = M::COLLECTION, %id, "DELETE record");
        let response = self
            .http
            .delete(self.record_url(id)?)
            .send()
            .await
            .map_err(transport)?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
