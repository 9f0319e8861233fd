//! Bindings from store state to cached backend reads.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::{QueryClient, QueryState};
use super::key::{EntityKind, QueryKey};
use crate::api::{ApiCall, ApiPath, Page};
use crate::error::LeadflowError;
use crate::store::{FilterStore, RequestBody, SortSpec, SortStore};

/// Body posted to list endpoints.
///
/// `filter` is serialized as `null` when no filter is applied, which tells the
/// backend to use its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    pub filter: Option<RequestBody>,
    pub sort: SortSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

fn decode_shared<T: DeserializeOwned>(endpoint: &str, data: &Value) -> crate::error::Result<T> {
    T::deserialize(data).map_err(|source| LeadflowError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// A paginated list view bound to its filter and sort stores.
///
/// Every read derives the key and the request body from one snapshot of the
/// stores, so a write made after [`read`](Self::read) starts is picked up by
/// the next read rather than mixed into the current one.
pub struct ListQuery<T> {
    client: Arc<QueryClient>,
    api: ApiCall,
    entity: EntityKind,
    path: ApiPath,
    filter: FilterStore,
    sort: SortStore,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for ListQuery<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            api: self.api.clone(),
            entity: self.entity,
            path: self.path.clone(),
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ListQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListQuery")
            .field("entity", &self.entity)
            .field("scope", self.api.scope())
            .field("path", &self.path)
            .finish()
    }
}

impl<T: DeserializeOwned> ListQuery<T> {
    pub fn new(
        client: Arc<QueryClient>,
        api: ApiCall,
        entity: EntityKind,
        path: impl Into<ApiPath>,
        filter: FilterStore,
        sort: SortStore,
    ) -> Self {
        Self {
            client,
            api,
            entity,
            path: path.into(),
            filter,
            sort,
            _item: PhantomData,
        }
    }

    pub fn filter(&self) -> &FilterStore {
        &self.filter
    }

    pub fn sort(&self) -> &SortStore {
        &self.sort
    }

    fn snapshot(&self) -> (QueryKey, ListRequest) {
        let filter = self.filter.request_body();
        let sort = self.sort.sort();
        let search = self.filter.search_text();
        let search = search.trim();

        let key = QueryKey::new(self.entity, self.api.scope())
            .with_params(&filter)
            .with_sort(&sort)
            .with_search(search);
        let request = ListRequest {
            filter,
            sort,
            search: (!search.is_empty()).then(|| search.to_string()),
        };
        (key, request)
    }

    /// Key for the current store state.
    pub fn key(&self) -> QueryKey {
        self.snapshot().0
    }

    /// Body the next read would send.
    pub fn request(&self) -> ListRequest {
        self.snapshot().1
    }

    /// Cached state for the current key, without fetching.
    pub fn state(&self) -> QueryState<Page<T>> {
        let endpoint = format!("POST {}", self.path);
        self.client
            .state(&self.key())
            .and_then(|data| decode_shared(&endpoint, &data))
    }

    /// Read the page for the current store state, fetching if the key is stale.
    pub async fn read(&self) -> QueryState<Page<T>> {
        let (key, request) = self.snapshot();
        let endpoint = format!("POST {}", self.path);
        let api = self.api.clone();
        let path = self.path.clone();

        let state = self
            .client
            .fetch(&key, move || async move {
                api.post::<_, Value>(path, &request).await
            })
            .await;

        state.and_then(|data| decode_shared(&endpoint, &data))
    }

    /// Mark the current key stale.
    pub fn invalidate(&self) -> bool {
        self.client.invalidate(&self.key())
    }

    /// Invalidate the current key and read it again.
    pub async fn refetch(&self) -> QueryState<Page<T>> {
        self.invalidate();
        self.read().await
    }

    /// Wait until a store write changes the derived key, and return the new key.
    ///
    /// Writes that leave the key unchanged (for example editing criteria while
    /// no filter is applied) do not wake the caller.
    pub async fn next_change(&self) -> QueryKey {
        let mut criteria = self.filter.criteria_store().subscribe();
        let mut search = self.filter.search_store().subscribe();
        let mut sort = self.sort.spec_store().subscribe();
        let current = self.key();

        loop {
            tokio::select! {
                _ = criteria.changed() => {}
                _ = search.changed() => {}
                _ = sort.changed() => {}
            }
            let key = self.key();
            if key != current {
                tracing::trace!(from = %current, to = %key, "list query key changed");
                return key;
            }
        }
    }
}

/// A single resource read with GET, such as workspace settings.
pub struct ResourceQuery<T> {
    client: Arc<QueryClient>,
    api: ApiCall,
    key: QueryKey,
    path: ApiPath,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceQuery<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            api: self.api.clone(),
            key: self.key.clone(),
            path: self.path.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResourceQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceQuery")
            .field("key", &self.key)
            .field("path", &self.path)
            .finish()
    }
}

impl<T: DeserializeOwned> ResourceQuery<T> {
    pub fn new(
        client: Arc<QueryClient>,
        api: ApiCall,
        entity: EntityKind,
        path: impl Into<ApiPath>,
    ) -> Self {
        let key = QueryKey::new(entity, api.scope());
        Self {
            client,
            api,
            key,
            path: path.into(),
            _item: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn state(&self) -> QueryState<T> {
        let endpoint = format!("GET {}", self.path);
        self.client
            .state(&self.key)
            .and_then(|data| decode_shared(&endpoint, &data))
    }

    pub async fn read(&self) -> QueryState<T> {
        let endpoint = format!("GET {}", self.path);
        let api = self.api.clone();
        let path = self.path.clone();

        let state = self
            .client
            .fetch(&self.key, move || async move { api.get::<Value>(path).await })
            .await;

        state.and_then(|data| decode_shared(&endpoint, &data))
    }

    pub fn invalidate(&self) -> bool {
        self.client.invalidate(&self.key)
    }

    pub async fn refetch(&self) -> QueryState<T> {
        self.invalidate();
        self.read().await
    }
}
