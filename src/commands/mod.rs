mod billing;
mod config;
mod customers;
mod deals;
mod login;
mod scripts;
mod workspaces;

pub use billing::{cmd_billing_change_plan, cmd_billing_show};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use customers::{cmd_customers_create, cmd_customers_ls};
pub use deals::{cmd_deals_create, cmd_deals_ls, cmd_deals_update};
pub use login::{cmd_login_request, cmd_login_verify};
pub use scripts::{cmd_scripts_ls, cmd_scripts_update};
pub use workspaces::{cmd_workspaces_ls, cmd_workspaces_settings};

use jiff::Timestamp;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::api::Page;
use crate::cli::{ListArgs, OutputOptions};
use crate::error::Result;
use crate::store::{FilterStore, SortStore};

/// Result of a command in both output formats.
pub struct CommandOutput {
    json: serde_json::Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: serde_json::Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Write list flags into the view's stores.
///
/// Flags are layered over the current criteria. Any narrowing flag marks the
/// filter applied and rebuilds the request body from the resulting criteria.
pub fn apply_list_args(filter: &FilterStore, sort: &SortStore, args: &ListArgs, now: Timestamp) {
    if args.narrows() {
        let mut criteria = filter.filter();
        if let Some(preset) = args.date {
            criteria = criteria.with_preset(preset, now);
        }
        if args.from.is_some() || args.to.is_some() {
            let from = args.from.unwrap_or(criteria.from);
            let to = args.to.unwrap_or(criteria.to);
            criteria = criteria.with_range(from, to);
        }
        if !args.status.is_empty() {
            criteria.status_selected = args.status.iter().copied().collect();
        }
        if !args.tag.is_empty() {
            criteria.tag_selected = args.tag.iter().cloned().collect();
        }
        if !args.assignee.is_empty() {
            criteria.assign_to = args.assignee.iter().cloned().collect();
        }
        if !args.category.is_empty() {
            criteria.category_selected = args.category.iter().cloned().collect();
        }
        if !args.source.is_empty() {
            criteria.source_selected = args.source.iter().cloned().collect();
        }

        let mut body = criteria.derive_body(args.limit.unwrap_or(filter.page_limit()));
        body.page = args.page;
        criteria.filter_body = Some(body);
        criteria.is_filter_applied = true;
        filter.set_filter(criteria);
    }

    if let Some(search) = &args.search {
        filter.set_search_text(search.clone());
    }
    if let Some(spec) = &args.sort {
        sort.set_sort(spec.clone());
    }
}

/// "Showing 20 of 143 deals" footer for list output.
pub fn page_footer<T>(page: &Page<T>, noun: &str) -> String {
    let text = if page.has_more() {
        format!("Showing {} of {} {noun}", page.len(), page.total_elements)
    } else {
        format!("{} {noun}", page.len())
    };
    text.dimmed().to_string()
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
pub fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DatePreset, RequestBody, SortSpec};
    use std::str::FromStr;

    fn now() -> Timestamp {
        Timestamp::from_str("2026-03-15T12:00:00Z").unwrap()
    }

    #[test]
    fn test_no_flags_leaves_filter_unapplied() {
        let filter = FilterStore::deals_at(now(), 20);
        let sort = SortStore::default();
        apply_list_args(&filter, &sort, &ListArgs::default(), now());
        assert!(!filter.filter().is_filter_applied);
        assert_eq!(filter.request_body(), None);
    }

    #[test]
    fn test_flags_apply_filter_and_build_body() {
        let filter = FilterStore::deals_at(now(), 20);
        let sort = SortStore::default();
        let args = ListArgs {
            date: Some(DatePreset::Last7Days),
            tag: vec!["vip".to_string()],
            limit: Some(50),
            search: Some("renewal".to_string()),
            sort: Some(SortSpec::from_str("amount:desc").unwrap()),
            ..Default::default()
        };
        apply_list_args(&filter, &sort, &args, now());

        let body = filter.request_body().unwrap();
        assert_eq!(body.limit, 50);
        assert_eq!(body.tags, vec!["vip".to_string()]);
        // The default open-status selection is kept
        assert_eq!(body.status, vec![1]);
        assert_eq!(body.from.as_deref(), Some("2026-03-08T12:00:00Z"));
        assert_eq!(filter.search_text(), "renewal");
        assert_eq!(sort.sort().to_string(), "amount:desc");
    }

    #[test]
    fn test_page_only_keeps_prepared_window() {
        let filter = FilterStore::customers_at(now(), 20);
        let sort = SortStore::default();
        let args = ListArgs {
            page: Some(2),
            ..Default::default()
        };
        apply_list_args(&filter, &sort, &args, now());

        let mut expected = RequestBody::with_limit(20);
        expected.page = Some(2);
        expected.from = Some("2026-02-13T12:00:00Z".to_string());
        expected.to = Some("2026-03-15T12:00:00Z".to_string());
        assert_eq!(filter.request_body(), Some(expected));
    }

    #[test]
    fn test_mask_sensitive_value() {
        assert_eq!(mask_sensitive_value("lf_abcdef"), "lf...ef");
        assert_eq!(mask_sensitive_value("abc"), "****");
    }
}
