//! Call-campaign scripts.

use std::sync::Arc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::api::{ApiCall, ApiPath, Page};
use crate::error::{LeadflowError, Result};
use crate::query::{EntityKind, QueryClient, ResourceQuery};

pub const SCRIPTS_PATH: &str = "call-scripts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallScript {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

pub fn scripts_query(client: Arc<QueryClient>, api: ApiCall) -> ResourceQuery<Page<CallScript>> {
    ResourceQuery::new(client, api, EntityKind::CallScripts, SCRIPTS_PATH)
}

pub async fn update_script(
    client: &QueryClient,
    api: &ApiCall,
    id: &str,
    update: &ScriptUpdate,
) -> Result<CallScript> {
    if update.name.is_none() && update.body.is_none() {
        return Err(LeadflowError::Other(format!(
            "nothing to update for script {id}"
        )));
    }
    let scope = api.scope();
    let path = ApiPath::new(SCRIPTS_PATH).id(id)?;
    client
        .mutate(api.patch(path, update), |key| {
            key.overlaps(EntityKind::CallScripts, scope)
        })
        .await
}
