//! Organization subscription and plan changes.

use std::sync::Arc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::api::ApiCall;
use crate::error::Result;
use crate::query::{EntityKind, QueryClient, ResourceQuery};

pub const SUBSCRIPTION_PATH: &str = "billing/subscription";
pub const PLAN_CHANGE_PATH: &str = "billing/subscription/plan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: String,
    pub status: String,
    #[serde(default)]
    pub seats: Option<u32>,
    #[serde(default)]
    pub current_period_end: Option<Timestamp>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChange {
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
}

pub fn subscription_query(client: Arc<QueryClient>, api: ApiCall) -> ResourceQuery<Subscription> {
    ResourceQuery::new(client, api, EntityKind::Subscription, SUBSCRIPTION_PATH)
}

/// Switch plans. The subscription belongs to the organization, so cached
/// subscriptions under every workspace of the organization are invalidated.
pub async fn change_plan(
    client: &QueryClient,
    api: &ApiCall,
    change: &PlanChange,
) -> Result<Subscription> {
    let org_id = api.scope().org_id.as_str();
    client
        .mutate(api.post(PLAN_CHANGE_PATH, change), |key| {
            key.targets_org(EntityKind::Subscription, org_id)
        })
        .await
}
