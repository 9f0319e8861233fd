use jiff::Timestamp;
use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{CommandOutput, apply_list_args, or_dash, page_footer};
use crate::api::ApiCall;
use crate::cli::{ListArgs, OutputOptions};
use crate::context::AppContext;
use crate::crm::customers::{self, Customer, NewCustomer};
use crate::error::Result;

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            name: customer.name.clone(),
            email: or_dash(customer.email.as_deref()),
            source: or_dash(customer.source.as_deref()),
            tags: customer.tags.join(", "),
        }
    }
}

/// List customers matching the filter flags
pub async fn cmd_customers_ls(ctx: &AppContext, api: ApiCall, args: &ListArgs) -> Result<()> {
    apply_list_args(
        &ctx.customers_filter,
        &ctx.customers_sort,
        args,
        Timestamp::now(),
    );
    let query = ctx.customers(api);
    let request = query.request();
    let page = query.read().await.into_result()?;

    let json_output = json!({
        "request": request,
        "total": page.total_elements,
        "customers": page.content,
    });

    let text_output = if page.is_empty() {
        "No customers found.".to_string()
    } else {
        let rows: Vec<CustomerRow> = page.content.iter().map(CustomerRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        format!("{table}\n{}", page_footer(&page, "customers"))
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(OutputOptions { json: args.json })
}

pub async fn cmd_customers_create(
    ctx: &AppContext,
    api: ApiCall,
    customer: NewCustomer,
    json: bool,
) -> Result<()> {
    let created = customers::create_customer(&ctx.queries, &api, &customer).await?;

    let text = format!("Created customer {} {}", created.id.cyan(), created.name);
    CommandOutput::new(json!({
        "action": "customer_created",
        "customer": created,
    }))
    .with_text(text)
    .print(OutputOptions { json })
}
