use std::fs;
use std::path::Path;
use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, or_dash, page_footer};
use crate::api::ApiCall;
use crate::cli::OutputOptions;
use crate::context::AppContext;
use crate::crm::campaigns::{self, ScriptUpdate};
use crate::error::{LeadflowError, Result};

#[derive(Tabled)]
struct ScriptRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Campaign")]
    campaign: String,
    #[tabled(rename = "Lines")]
    lines: usize,
}

pub async fn cmd_scripts_ls(ctx: &AppContext, api: ApiCall, json: bool) -> Result<()> {
    let page = campaigns::scripts_query(Arc::clone(&ctx.queries), api)
        .read()
        .await
        .into_result()?;

    let text_output = if page.is_empty() {
        "No call scripts found.".to_string()
    } else {
        let rows: Vec<ScriptRow> = page
            .content
            .iter()
            .map(|script| ScriptRow {
                id: script.id.clone(),
                name: script.name.clone(),
                campaign: or_dash(script.campaign_id.as_deref()),
                lines: script.body.lines().count(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        format!("{table}\n{}", page_footer(&page, "scripts"))
    };

    CommandOutput::new(json!({
        "total": page.total_elements,
        "scripts": page.content,
    }))
    .with_text(text_output)
    .print(OutputOptions { json })
}

pub async fn cmd_scripts_update(
    ctx: &AppContext,
    api: ApiCall,
    id: &str,
    name: Option<String>,
    body_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let body = body_file
        .map(|path| {
            fs::read_to_string(path).map_err(|e| {
                LeadflowError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read script body from {}: {}", path.display(), e),
                ))
            })
        })
        .transpose()?;

    let script = campaigns::update_script(&ctx.queries, &api, id, &ScriptUpdate { name, body }).await?;

    CommandOutput::new(json!({
        "action": "script_updated",
        "script": script,
    }))
    .with_text(format!("Updated script {} {}", script.id.cyan(), script.name))
    .print(OutputOptions { json })
}
