//! Workspaces within an organization and their settings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiCall, ApiPath, Page};
use crate::error::{LeadflowError, Result};
use crate::query::{EntityKind, QueryClient, ResourceQuery};

pub const WORKSPACES_PATH: &str = "workspaces";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub member_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub pipeline_stages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_stages: Option<Vec<String>>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn workspaces_query(client: Arc<QueryClient>, api: ApiCall) -> ResourceQuery<Page<Workspace>> {
    ResourceQuery::new(client, api, EntityKind::Workspaces, WORKSPACES_PATH)
}

fn settings_path(api: &ApiCall) -> Result<ApiPath> {
    match &api.scope().workspace_id {
        Some(workspace_id) => Ok(ApiPath::new(WORKSPACES_PATH)
            .id(workspace_id)?
            .join("settings")),
        None => Err(LeadflowError::Config(
            "workspace settings need a workspace; pass --workspace or set default_scope.workspace_id"
                .to_string(),
        )),
    }
}

/// Settings of the workspace the client is scoped to.
pub fn settings_query(
    client: Arc<QueryClient>,
    api: ApiCall,
) -> Result<ResourceQuery<WorkspaceSettings>> {
    let path = settings_path(&api)?;
    Ok(ResourceQuery::new(
        client,
        api,
        EntityKind::WorkspaceSettings,
        path,
    ))
}

/// Patch the workspace settings; on success the settings key is invalidated
/// so the next read returns the stored values.
pub async fn update_settings(
    client: &QueryClient,
    api: &ApiCall,
    update: &SettingsUpdate,
) -> Result<WorkspaceSettings> {
    let path = settings_path(api)?;
    let scope = api.scope();
    client
        .mutate(api.patch(path, update), |key| {
            key.targets(EntityKind::WorkspaceSettings, scope)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiSettings, create_api_call};

    #[test]
    fn test_settings_require_workspace_scope() {
        let settings = ApiSettings::new("http://127.0.0.1:9").unwrap();
        let client = Arc::new(QueryClient::new());

        let org_only = create_api_call(&settings, "acme", None).unwrap();
        assert!(matches!(
            settings_query(Arc::clone(&client), org_only),
            Err(LeadflowError::Config(_))
        ));

        let scoped = create_api_call(&settings, "acme", Some("sales")).unwrap();
        let query = settings_query(client, scoped).unwrap();
        assert_eq!(query.key().to_string(), "workspace-settings@acme/sales");
    }
}
