use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::{QueryCache, QueryFilter, QueryKey, QueryObserver, QueryResult};
use crate::client::ResourceClient;
use crate::error::ResourceError;
use crate::resource::Resource;

/// Typed queries and mutations for one resource, bound to a shared cache.
///
/// Reads use the keys `collection` and `collection:id`. Every update and
/// delete invalidates both the list key and the record's key; create
/// invalidates the list and primes the new record's key.
pub struct ResourceQueries<M, C> {
    client: Arc<C>,
    cache: QueryCache,
    _marker: PhantomData<fn() -> M>,
}

impl<M, C> Clone for ResourceQueries<M, C> {
    fn clone(&self) -> Self {
        ResourceQueries {
            client: Arc::clone(&self.client),
            cache: self.cache.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M: Resource, C: ResourceClient<M> + 'static> ResourceQueries<M, C> {
    pub fn new(client: Arc<C>, cache: QueryCache) -> Self {
        ResourceQueries {
            client,
            cache,
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn list_key() -> QueryKey {
        QueryKey::list(M::COLLECTION)
    }

    pub fn detail_key(id: &str) -> QueryKey {
        QueryKey::detail(M::COLLECTION, id)
    }

    /// Every record of the collection.
    pub async fn list(&self) -> QueryResult<Vec<M>> {
        let client = Arc::clone(&self.client);
        self.cache
            .fetch(&Self::list_key(), move || {
                let client = Arc::clone(&client);
                async move { client.list().await }
            })
            .await
    }

    /// One record by id.
    pub async fn get(&self, id: &str) -> QueryResult<M> {
        let client = Arc::clone(&self.client);
        let owned_id = id.to_string();
        self.cache
            .fetch(&Self::detail_key(id), move || {
                let client = Arc::clone(&client);
                let id = owned_id.clone();
                async move { client.get(&id).await }
            })
            .await
    }

    /// Cached list state without fetching.
    pub fn peek_list(&self) -> QueryResult<Vec<M>> {
        self.cache.peek(&Self::list_key())
    }

    pub fn observe_list(&self) -> QueryObserver {
        self.cache.observe(&Self::list_key())
    }

    pub fn observe(&self, id: &str) -> QueryObserver {
        self.cache.observe(&Self::detail_key(id))
    }

    pub async fn create<D>(&self, fields: &D) -> Result<M, ResourceError>
    where
        D: Serialize + Send + Sync + ?Sized,
    {
        let created = self
            .cache
            .mutate(
                self.client.create(fields),
                &[QueryFilter::Exact(Self::list_key())],
            )
            .await?;
        // The record exists on the backend; a cold detail entry only costs a refetch.
        if let Err(error) = self.cache.set_data(&Self::detail_key(created.id()), &created) {
            warn!(collection = M::COLLECTION, id = created.id(), %error, "could not prime detail query");
        }
        info!(collection = M::COLLECTION, id = created.id(), "record created");
        Ok(created)
    }

    pub async fn update<P>(&self, id: &str, patch: &P) -> Result<M, ResourceError>
    where
        P: Serialize + Send + Sync + ?Sized,
    {
        let updated = self
            .cache
            .mutate(self.client.update(id, patch), &Self::record_filters(id))
            .await?;
        info!(collection = M::COLLECTION, %id, "record updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        self.cache
            .mutate(self.client.delete(id), &Self::record_filters(id))
            .await?;
        info!(collection = M::COLLECTION, %id, "record deleted");
        Ok(())
    }

    fn record_filters(id: &str) -> [QueryFilter; 2] {
        [
            QueryFilter::Exact(Self::list_key()),
            QueryFilter::Exact(Self::detail_key(id)),
        ]
    }
}
