use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::crm::DealStatus;
use crate::store::{DatePreset, SortSpec};

#[derive(Parser)]
#[command(name = "leadflow")]
#[command(about = "Command-line client for the Leadflow CRM")]
#[command(version)]
pub struct Cli {
    /// Organization id (default: default_scope.org_id from the config)
    #[arg(long, global = true, env = "LEADFLOW_ORG")]
    pub org: Option<String>,

    /// Workspace id (default: default_scope.workspace_id from the config)
    #[arg(long, global = true, env = "LEADFLOW_WORKSPACE")]
    pub workspace: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format flags shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deals pipeline
    Deals {
        #[command(subcommand)]
        action: DealsAction,
    },

    /// Customers
    Customers {
        #[command(subcommand)]
        action: CustomersAction,
    },

    /// Workspaces of the organization and their settings
    #[command(visible_alias = "ws")]
    Workspaces {
        #[command(subcommand)]
        action: WorkspacesAction,
    },

    /// Subscription and plan
    Billing {
        #[command(subcommand)]
        action: BillingAction,
    },

    /// Call-campaign scripts
    Scripts {
        #[command(subcommand)]
        action: ScriptsAction,
    },

    /// Sign in with a one-time password
    Login {
        #[command(subcommand)]
        action: LoginAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Filter, search and sort flags for list commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Date window: -7, -30, -90, -365, -9999 (all time) or custom
    #[arg(long, allow_hyphen_values = true, value_parser = parse_date_preset)]
    pub date: Option<DatePreset>,

    /// Window start (RFC 3339 timestamp or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    pub from: Option<Timestamp>,

    /// Window end (RFC 3339 timestamp or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp)]
    pub to: Option<Timestamp>,

    /// Status codes or names (open, won, lost); comma separated
    #[arg(long, value_delimiter = ',', value_parser = parse_status_code)]
    pub status: Vec<u32>,

    /// Tags; comma separated
    #[arg(long, value_delimiter = ',')]
    pub tag: Vec<String>,

    /// Assignee ids; comma separated
    #[arg(long, value_delimiter = ',')]
    pub assignee: Vec<String>,

    /// Categories; comma separated
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<String>,

    /// Lead sources; comma separated
    #[arg(long, value_delimiter = ',')]
    pub source: Vec<String>,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort specification, e.g. "amount:desc,title"
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortSpec>,

    /// Page size (default: page_limit from the config)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// True when any narrowing or pagination flag was given.
    pub fn narrows(&self) -> bool {
        self.date.is_some()
            || self.from.is_some()
            || self.to.is_some()
            || !self.status.is_empty()
            || !self.tag.is_empty()
            || !self.assignee.is_empty()
            || !self.category.is_empty()
            || !self.source.is_empty()
            || self.limit.is_some()
            || self.page.is_some()
    }
}

#[derive(Subcommand)]
pub enum DealsAction {
    /// List deals
    #[command(visible_alias = "l")]
    Ls {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Create a deal
    Create {
        /// Deal title
        title: String,

        #[arg(long)]
        amount: Option<f64>,

        /// ISO 4217 currency code
        #[arg(long)]
        currency: Option<String>,

        /// Customer id
        #[arg(long)]
        customer: Option<String>,

        /// Pipeline stage
        #[arg(long)]
        stage: Option<String>,

        #[arg(long, value_delimiter = ',')]
        tag: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a deal
    Update {
        /// Deal id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        stage: Option<String>,

        /// open, won or lost
        #[arg(long, value_parser = parse_deal_status)]
        status: Option<DealStatus>,

        /// Assignee id
        #[arg(long)]
        assignee: Option<String>,

        /// Replace the tags; comma separated
        #[arg(long, value_delimiter = ',')]
        tag: Option<Vec<String>>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CustomersAction {
    /// List customers
    #[command(visible_alias = "l")]
    Ls {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Create a customer
    Create {
        /// Customer name
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Lead source
        #[arg(long)]
        source: Option<String>,

        #[arg(long, value_delimiter = ',')]
        tag: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum WorkspacesAction {
    /// List workspaces in the organization
    #[command(visible_alias = "l")]
    Ls {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or update the settings of the current workspace
    Settings {
        /// Set the currency
        #[arg(long)]
        currency: Option<String>,

        /// Set the timezone (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Replace the pipeline stages; comma separated
        #[arg(long = "stage", value_delimiter = ',')]
        stages: Option<Vec<String>>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum BillingAction {
    /// Show the current subscription
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Switch to another plan
    ChangePlan {
        /// Plan identifier
        plan: String,

        /// Number of seats
        #[arg(long)]
        seats: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ScriptsAction {
    /// List call scripts
    #[command(visible_alias = "l")]
    Ls {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a call script
    Update {
        /// Script id
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Read the script body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum LoginAction {
    /// Send a one-time password to an email address
    Request {
        email: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify the one-time password and store the session token
    Verify {
        code: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.base_url, auth.token, default.org)
        key: String,
        /// Value to set
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_date_preset(s: &str) -> Result<DatePreset, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "date preset",
        DatePreset::ALL_STRINGS,
    )
}

fn parse_deal_status(s: &str) -> Result<DealStatus, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "status",
        &["open", "won", "lost"],
    )
}

fn parse_status_code(s: &str) -> Result<u32, String> {
    if let Ok(code) = s.trim().parse::<u32>() {
        return Ok(code);
    }
    parse_deal_status(s).map(DealStatus::code)
}

fn parse_sort(s: &str) -> Result<SortSpec, String> {
    s.parse().map_err(|e: crate::error::LeadflowError| e.to_string())
}

/// Accept a full timestamp or a calendar date (midnight UTC).
pub fn parse_timestamp(s: &str) -> Result<Timestamp, String> {
    let s = s.trim();
    if let Ok(ts) = s.parse::<Timestamp>() {
        return Ok(ts);
    }
    s.parse::<jiff::civil::Date>()
        .and_then(|date| date.to_zoned(TimeZone::UTC))
        .map(|zoned| zoned.timestamp())
        .map_err(|_| format!("Invalid date '{s}'. Use YYYY-MM-DD or an RFC 3339 timestamp"))
}
