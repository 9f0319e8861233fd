//! Deals pipeline.

use std::sync::Arc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::api::{ApiCall, ApiPath};
use crate::error::{LeadflowError, Result};
use crate::query::{EntityKind, ListQuery, QueryClient};
use crate::store::{FilterStore, SortStore};

pub const DEALS_QUERY_PATH: &str = "deals/query";
pub const DEALS_PATH: &str = "deals";

/// Pipeline status of a deal, as the backend's numeric status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealStatus {
    Open,
    Won,
    Lost,
}

crate::enum_display_fromstr!(DealStatus, LeadflowError::InvalidDealStatus, {
    Open => "open",
    Won => "won",
    Lost => "lost",
});

impl DealStatus {
    pub const ALL: &[DealStatus] = &[DealStatus::Open, DealStatus::Won, DealStatus::Lost];

    pub fn code(self) -> u32 {
        match self {
            DealStatus::Open => 1,
            DealStatus::Won => 2,
            DealStatus::Lost => 3,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    pub status: u32,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub assign_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Deal {
    pub fn deal_status(&self) -> Option<DealStatus> {
        DealStatus::from_code(self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl DealUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Deals list bound to `filter` and `sort`.
pub fn deals_query(
    client: Arc<QueryClient>,
    api: ApiCall,
    filter: FilterStore,
    sort: SortStore,
) -> ListQuery<Deal> {
    ListQuery::new(client, api, EntityKind::Deals, DEALS_QUERY_PATH, filter, sort)
}

pub async fn create_deal(client: &QueryClient, api: &ApiCall, deal: &NewDeal) -> Result<Deal> {
    let scope = api.scope();
    client
        .mutate(api.post(DEALS_PATH, deal), |key| {
            key.overlaps(EntityKind::Deals, scope)
        })
        .await
}

/// Update one deal.
///
/// On success every deals list that can contain the deal is invalidated: the
/// lists of its workspace and the organization-wide lists.
pub async fn update_deal(
    client: &QueryClient,
    api: &ApiCall,
    id: &str,
    update: &DealUpdate,
) -> Result<Deal> {
    if update.is_empty() {
        return Err(LeadflowError::Other(format!("nothing to update for deal {id}")));
    }
    let scope = api.scope();
    let path = ApiPath::new(DEALS_PATH).id(id)?;
    client
        .mutate(api.patch(path, update), |key| {
            key.overlaps(EntityKind::Deals, scope)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(DealStatus::Open.code(), 1);
        assert_eq!(DealStatus::from_code(3), Some(DealStatus::Lost));
        assert_eq!(DealStatus::from_code(9), None);
        assert_eq!("WON".parse::<DealStatus>().unwrap(), DealStatus::Won);
        assert!(matches!(
            "pending".parse::<DealStatus>(),
            Err(LeadflowError::InvalidDealStatus(_))
        ));
    }

    #[test]
    fn test_deal_decodes_with_optional_fields_missing() {
        let deal: Deal = serde_json::from_value(json!({
            "id": "d1",
            "title": "Renewal",
            "status": 1,
            "createdAt": "2026-03-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(deal.deal_status(), Some(DealStatus::Open));
        assert!(deal.tags.is_empty());
        assert_eq!(deal.created_at.unwrap().to_string(), "2026-03-01T09:30:00Z");
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let update = DealUpdate {
            stage: Some("negotiation".to_string()),
            status: Some(DealStatus::Won.code()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "stage": "negotiation", "status": 2 })
        );
        assert!(DealUpdate::default().is_empty());
    }
}
