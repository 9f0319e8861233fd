use jiff::Timestamp;
use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, apply_list_args, or_dash, page_footer};
use crate::api::ApiCall;
use crate::cli::{ListArgs, OutputOptions};
use crate::context::AppContext;
use crate::crm::deals::{self, Deal, DealStatus, DealUpdate, NewDeal};
use crate::error::Result;

#[derive(Tabled)]
struct DealRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn format_status(code: u32) -> String {
    match DealStatus::from_code(code) {
        Some(DealStatus::Open) => "open".yellow().to_string(),
        Some(DealStatus::Won) => "won".green().to_string(),
        Some(DealStatus::Lost) => "lost".dimmed().to_string(),
        None => code.to_string(),
    }
}

fn format_amount(deal: &Deal) -> String {
    match (deal.amount, deal.currency.as_deref()) {
        (Some(amount), Some(currency)) => format!("{amount:.2} {currency}"),
        (Some(amount), None) => format!("{amount:.2}"),
        (None, _) => "-".to_string(),
    }
}

fn deal_row(deal: &Deal) -> DealRow {
    DealRow {
        id: deal.id.clone(),
        title: deal.title.clone(),
        amount: format_amount(deal),
        stage: or_dash(deal.stage.as_deref()),
        status: format_status(deal.status),
        created: deal
            .created_at
            .map(|ts| ts.strftime("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string()),
    }
}

/// List deals matching the filter flags
pub async fn cmd_deals_ls(ctx: &AppContext, api: ApiCall, args: &ListArgs) -> Result<()> {
    apply_list_args(&ctx.deals_filter, &ctx.deals_sort, args, Timestamp::now());
    let query = ctx.deals(api);
    let request = query.request();
    let page = query.read().await.into_result()?;

    let json_output = json!({
        "request": request,
        "total": page.total_elements,
        "deals": page.content,
    });

    let text_output = if page.is_empty() {
        "No deals found.".to_string()
    } else {
        let rows: Vec<DealRow> = page.content.iter().map(deal_row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        format!("{table}\n{}", page_footer(&page, "deals"))
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(OutputOptions { json: args.json })
}

pub async fn cmd_deals_create(ctx: &AppContext, api: ApiCall, deal: NewDeal, json: bool) -> Result<()> {
    let created = deals::create_deal(&ctx.queries, &api, &deal).await?;

    let text = format!("Created deal {} {}", created.id.cyan(), created.title);
    CommandOutput::new(json!({
        "action": "deal_created",
        "deal": created,
    }))
    .with_text(text)
    .print(OutputOptions { json })
}

pub async fn cmd_deals_update(
    ctx: &AppContext,
    api: ApiCall,
    id: &str,
    update: DealUpdate,
    json: bool,
) -> Result<()> {
    let updated = deals::update_deal(&ctx.queries, &api, id, &update).await?;

    let text = format!(
        "Updated deal {} [{}] {}",
        updated.id.cyan(),
        format_status(updated.status),
        updated.title
    );
    CommandOutput::new(json!({
        "action": "deal_updated",
        "deal": updated,
    }))
    .with_text(text)
    .print(OutputOptions { json })
}
