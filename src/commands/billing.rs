use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::api::ApiCall;
use crate::cli::OutputOptions;
use crate::context::AppContext;
use crate::crm::billing::{self, PlanChange, Subscription};
use crate::error::Result;

fn format_subscription(sub: &Subscription) -> String {
    let status = match sub.status.as_str() {
        "active" | "trialing" => sub.status.green().to_string(),
        "past_due" | "unpaid" => sub.status.red().to_string(),
        _ => sub.status.yellow().to_string(),
    };

    let mut text = format!(
        "{}\n  plan:   {}\n  status: {}",
        "Subscription:".cyan().bold(),
        sub.plan,
        status
    );
    if let Some(seats) = sub.seats {
        text.push_str(&format!("\n  seats:  {seats}"));
    }
    if let Some(end) = sub.current_period_end {
        let label = if sub.cancel_at_period_end {
            "ends"
        } else {
            "renews"
        };
        text.push_str(&format!("\n  {label}: {}", end.strftime("%Y-%m-%d")));
    }
    text
}

pub async fn cmd_billing_show(ctx: &AppContext, api: ApiCall, json: bool) -> Result<()> {
    let subscription = billing::subscription_query(Arc::clone(&ctx.queries), api)
        .read()
        .await
        .into_result()?;

    CommandOutput::new(json!({ "subscription": subscription }))
        .with_text(format_subscription(&subscription))
        .print(OutputOptions { json })
}

pub async fn cmd_billing_change_plan(
    ctx: &AppContext,
    api: ApiCall,
    change: PlanChange,
    json: bool,
) -> Result<()> {
    let subscription = billing::change_plan(&ctx.queries, &api, &change).await?;

    CommandOutput::new(json!({
        "action": "plan_changed",
        "subscription": subscription,
    }))
    .with_text(format!(
        "Switched to plan {}\n{}",
        change.plan.cyan(),
        format_subscription(&subscription)
    ))
    .print(OutputOptions { json })
}
