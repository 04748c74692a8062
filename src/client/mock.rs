use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Latency, ResourceClient};
use crate::error::ResourceError;
use crate::resource::Resource;
use crate::store::Collection;

/// Mock API over an in-memory collection.
///
/// Each operation sleeps its fixed latency, then performs one synchronous
/// step on the collection. Clones share the collection and fault counter.
pub struct MockClient<M> {
    collection: Collection<M>,
    latency: Latency,
    failures: Arc<AtomicUsize>,
}

impl<M> Clone for MockClient<M> {
    fn clone(&self) -> Self {
        MockClient {
            collection: self.collection.clone(),
            latency: self.latency,
            failures: Arc::clone(&self.failures),
        }
    }
}

impl<M: Resource> MockClient<M> {
    /// Create a client with the default latency.
    pub fn new(collection: Collection<M>) -> Self {
        Self::with_latency(collection, Latency::default())
    }

    pub fn with_latency(collection: Collection<M>, latency: Latency) -> Self {
        MockClient {
            collection,
            latency,
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Access the backing collection.
    pub fn collection(&self) -> &Collection<M> {
        &self.collection
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    /// Make the next `count` operations fail with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    async fn simulate(&self, operation: &'static str, delay: Duration) -> Result<(), ResourceError> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            warn!(collection = M::COLLECTION, operation, "injected transport failure");
            return Err(ResourceError::Transport(format!(
                "simulated network error during {} {}",
                M::COLLECTION,
                operation
            )));
        }

        debug!(collection = M::COLLECTION, operation, ?delay, "mock call");
        Ok(())
    }
}

#[async_trait]
impl<M: Resource> ResourceClient<M> for MockClient<M> {
    async fn list(&self) -> Result<Vec<M>, ResourceError> {
        self.simulate("list", self.latency.list).await?;
        self.collection.list()
    }

    async fn get(&self, id: &str) -> Result<M, ResourceError> {
        self.simulate("get", self.latency.get).await?;
        self.collection.get(id)
    }

    async fn create<D>(&self, fields: &D) -> Result<M, ResourceError>
    where
        D: Serialize + Send + Sync + ?Sized,
    {
        self.simulate("create", self.latency.create).await?;
        self.collection.create(fields)
    }

    async fn update<P>(&self, id: &str, patch: &P) -> Result<M, ResourceError>
    where
        P: Serialize + Send + Sync + ?Sized,
    {
        self.simulate("update", self.latency.update).await?;
        self.collection.update(id, patch)
    }

    async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        self.simulate("delete", self.latency.delete).await?;
        self.collection.remove(id)?;
        Ok(())
    }
}
