use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use leadflow::cli::{
    BillingAction, Cli, Commands, ConfigAction, CustomersAction, DealsAction, LoginAction,
    OutputOptions, ScriptsAction, WorkspacesAction,
};
use leadflow::commands::{
    cmd_billing_change_plan, cmd_billing_show, cmd_config_get, cmd_config_set, cmd_config_show,
    cmd_customers_create, cmd_customers_ls, cmd_deals_create, cmd_deals_ls, cmd_deals_update,
    cmd_login_request, cmd_login_verify, cmd_scripts_ls, cmd_scripts_update, cmd_workspaces_ls,
    cmd_workspaces_settings,
};
use leadflow::context::AppContext;
use leadflow::crm::{DealUpdate, NewCustomer, NewDeal, PlanChange, SettingsUpdate};
use leadflow::error::Result;

fn install_tracing() {
    // LEADFLOW_LOG takes EnvFilter directives; the default only shows warnings.
    let filter = EnvFilter::try_from_env("LEADFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    // Config commands work without a context, so a broken config can be fixed
    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show { json } => cmd_config_show(OutputOptions { json: *json }),
            ConfigAction::Set { key, value, json } => {
                cmd_config_set(key, value, OutputOptions { json: *json })
            }
            ConfigAction::Get { key, json } => cmd_config_get(key, OutputOptions { json: *json }),
        };
    }

    let ctx = AppContext::load()?;
    let api = ctx.api(cli.org.as_deref(), cli.workspace.as_deref())?;

    match cli.command {
        Commands::Deals { action } => match action {
            DealsAction::Ls { list } => cmd_deals_ls(&ctx, api, &list).await,
            DealsAction::Create {
                title,
                amount,
                currency,
                customer,
                stage,
                tag,
                json,
            } => {
                let deal = NewDeal {
                    title,
                    amount,
                    currency,
                    customer_id: customer,
                    stage,
                    tags: tag,
                };
                cmd_deals_create(&ctx, api, deal, json).await
            }
            DealsAction::Update {
                id,
                title,
                amount,
                stage,
                status,
                assignee,
                tag,
                json,
            } => {
                let update = DealUpdate {
                    title,
                    amount,
                    stage,
                    status: status.map(|s| s.code()),
                    assign_to: assignee,
                    tags: tag,
                };
                cmd_deals_update(&ctx, api, &id, update, json).await
            }
        },

        Commands::Customers { action } => match action {
            CustomersAction::Ls { list } => cmd_customers_ls(&ctx, api, &list).await,
            CustomersAction::Create {
                name,
                email,
                phone,
                source,
                tag,
                json,
            } => {
                let customer = NewCustomer {
                    name,
                    email,
                    phone,
                    source,
                    tags: tag,
                };
                cmd_customers_create(&ctx, api, customer, json).await
            }
        },

        Commands::Workspaces { action } => match action {
            WorkspacesAction::Ls { json } => cmd_workspaces_ls(&ctx, api, json).await,
            WorkspacesAction::Settings {
                currency,
                timezone,
                stages,
                json,
            } => {
                let update = SettingsUpdate {
                    currency,
                    timezone,
                    pipeline_stages: stages,
                };
                cmd_workspaces_settings(&ctx, api, update, json).await
            }
        },

        Commands::Billing { action } => match action {
            BillingAction::Show { json } => cmd_billing_show(&ctx, api, json).await,
            BillingAction::ChangePlan { plan, seats, json } => {
                cmd_billing_change_plan(&ctx, api, PlanChange { plan, seats }, json).await
            }
        },

        Commands::Scripts { action } => match action {
            ScriptsAction::Ls { json } => cmd_scripts_ls(&ctx, api, json).await,
            ScriptsAction::Update {
                id,
                name,
                body_file,
                json,
            } => cmd_scripts_update(&ctx, api, &id, name, body_file.as_deref(), json).await,
        },

        Commands::Login { action } => match action {
            LoginAction::Request { email, json } => {
                cmd_login_request(&ctx, api, &email, json).await
            }
            LoginAction::Verify { code, json } => cmd_login_verify(&ctx, api, &code, json).await,
        },

        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
