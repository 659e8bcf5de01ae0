use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

use super::gateway::ApiClient;
use super::query::QueryParams;

/// List endpoints answer either with a plain array or with a page object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Items(Vec<T>),
    Paged(Paged<T>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    #[serde(alias = "data", alias = "results")]
    pub items: Vec<T>,
    #[serde(default, alias = "total")]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Items(v) => v,
            Listing::Paged(p) => &p.items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Items(v) => v,
            Listing::Paged(p) => p.items,
        }
    }

    /// Server-reported total when paged, otherwise the number of items received.
    pub fn total(&self) -> u64 {
        match self {
            Listing::Items(v) => v.len() as u64,
            Listing::Paged(p) => p.total_count.unwrap_or(p.items.len() as u64),
        }
    }
}

/// Page and search parameters shared by most list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListQuery {
    pub fn search(s: impl Into<String>) -> Self { Self { search: Some(s.into()), ..Default::default() } }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .opt("search", self.search.as_deref())
            .opt("page", self.page)
            .opt("pageSize", self.page_size)
    }
}

/// Plain CRUD under one collection path: `GET/POST {base}`, `GET/PUT/DELETE {base}/{id}`.
pub struct Resource<'a, T> {
    client: &'a ApiClient,
    base: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> Resource<'a, T> {
    pub fn new(client: &'a ApiClient, base: &'static str) -> Self { Self { client, base, _marker: PhantomData } }

    pub fn path(&self) -> &'static str { self.base }

    pub fn item_path(&self, id: i64) -> String { format!("{}/{}", self.base, id) }

    pub async fn list(&self, params: QueryParams) -> ApiResult<Listing<T>> { self.client.get(self.base, params).await }

    pub async fn get(&self, id: i64) -> ApiResult<T> { self.client.get(&self.item_path(id), QueryParams::new()).await }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> ApiResult<T> { self.client.post(self.base, body).await }

    pub async fn update<B: Serialize + ?Sized>(&self, id: i64, body: &B) -> ApiResult<T> {
        self.client.put(&self.item_path(id), body).await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> { self.client.delete(&self.item_path(id)).await }
}
