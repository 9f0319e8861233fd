use std::sync::Arc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::api::ApiCall;
use crate::error::Result;
use crate::query::{EntityKind, ListQuery, QueryClient};
use crate::store::{FilterStore, SortStore};

pub const CUSTOMERS_QUERY_PATH: &str = "customers/query";
pub const CUSTOMERS_PATH: &str = "customers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

pub fn customers_query(
    client: Arc<QueryClient>,
    api: ApiCall,
    filter: FilterStore,
    sort: SortStore,
) -> ListQuery<Customer> {
    ListQuery::new(
        client,
        api,
        EntityKind::Customers,
        CUSTOMERS_QUERY_PATH,
        filter,
        sort,
    )
}

pub async fn create_customer(
    client: &QueryClient,
    api: &ApiCall,
    customer: &NewCustomer,
) -> Result<Customer> {
    let scope = api.scope();
    client
        .mutate(api.post(CUSTOMERS_PATH, customer), |key| {
            key.overlaps(EntityKind::Customers, scope)
        })
        .await
}
