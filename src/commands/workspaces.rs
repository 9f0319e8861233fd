use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, or_dash, page_footer};
use crate::api::ApiCall;
use crate::cli::OutputOptions;
use crate::context::AppContext;
use crate::crm::workspaces::{self, SettingsUpdate, WorkspaceSettings};
use crate::error::Result;

#[derive(Tabled)]
struct WorkspaceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Members")]
    members: String,
}

pub async fn cmd_workspaces_ls(ctx: &AppContext, api: ApiCall, json: bool) -> Result<()> {
    let page = workspaces::workspaces_query(Arc::clone(&ctx.queries), api)
        .read()
        .await
        .into_result()?;

    let text_output = if page.is_empty() {
        "No workspaces found.".to_string()
    } else {
        let rows: Vec<WorkspaceRow> = page
            .content
            .iter()
            .map(|ws| WorkspaceRow {
                id: ws.id.clone(),
                name: ws.name.clone(),
                role: or_dash(ws.role.as_deref()),
                members: ws
                    .member_count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        format!("{table}\n{}", page_footer(&page, "workspaces"))
    };

    CommandOutput::new(json!({
        "total": page.total_elements,
        "workspaces": page.content,
    }))
    .with_text(text_output)
    .print(OutputOptions { json })
}

fn format_settings(settings: &WorkspaceSettings) -> String {
    let stages = if settings.pipeline_stages.is_empty() {
        "-".to_string()
    } else {
        settings.pipeline_stages.join(" > ")
    };
    format!(
        "{}\n  currency: {}\n  timezone: {}\n  stages:   {}",
        "Workspace settings:".cyan().bold(),
        or_dash(settings.currency.as_deref()),
        or_dash(settings.timezone.as_deref()),
        stages
    )
}

/// Show the workspace settings, applying `update` first when it sets anything.
pub async fn cmd_workspaces_settings(
    ctx: &AppContext,
    api: ApiCall,
    update: SettingsUpdate,
    json: bool,
) -> Result<()> {
    let query = workspaces::settings_query(Arc::clone(&ctx.queries), api.clone())?;

    let updated = !update.is_empty();
    if updated {
        workspaces::update_settings(&ctx.queries, &api, &update).await?;
    }
    let settings = query.read().await.into_result()?;

    let mut text = format_settings(&settings);
    if updated {
        text = format!("{}\n{text}", "Settings updated.".green());
    }

    CommandOutput::new(json!({
        "updated": updated,
        "settings": settings,
    }))
    .with_text(text)
    .print(OutputOptions { json })
}
