//! Explicitly passed application state.
//!
//! Holds the stores, the query cache and connection settings for one process.
//! Tests build their own context instead of sharing global state.

use std::sync::Arc;

use jiff::Timestamp;

use crate::api::{ApiCall, ApiSettings, create_api_call};
use crate::config::Config;
use crate::crm::{Customer, Deal, customers, deals};
use crate::error::Result;
use crate::paths::storage_path;
use crate::query::{ListQuery, QueryClient};
use crate::storage::LocalStorage;
use crate::store::{FilterStore, SortStore};

#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub settings: ApiSettings,
    pub queries: Arc<QueryClient>,
    pub deals_filter: FilterStore,
    pub deals_sort: SortStore,
    pub customers_filter: FilterStore,
    pub customers_sort: SortStore,
    pub storage: LocalStorage,
}

impl AppContext {
    pub fn new(config: Config, storage: LocalStorage) -> Result<Self> {
        Self::new_at(config, storage, Timestamp::now())
    }

    /// Context whose default date windows end at `now`.
    pub fn new_at(config: Config, storage: LocalStorage, now: Timestamp) -> Result<Self> {
        let settings = ApiSettings::from_config(&config)?;
        let limit = config.page_limit;
        Ok(Self {
            settings,
            queries: Arc::new(QueryClient::new()),
            deals_filter: FilterStore::deals_at(now, limit),
            deals_sort: SortStore::default(),
            customers_filter: FilterStore::customers_at(now, limit),
            customers_sort: SortStore::default(),
            storage,
            config,
        })
    }

    /// Load the config file and the persistent storage from their default paths.
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        let storage = LocalStorage::open(storage_path())?;
        Self::new(config, storage)
    }

    /// Client for the given scope, falling back to the configured default.
    pub fn api(&self, org_id: Option<&str>, workspace_id: Option<&str>) -> Result<ApiCall> {
        let (org_id, workspace_id) = self.config.resolve_scope(org_id, workspace_id)?;
        create_api_call(&self.settings, &org_id, workspace_id.as_deref())
    }

    pub fn deals(&self, api: ApiCall) -> ListQuery<Deal> {
        deals::deals_query(
            Arc::clone(&self.queries),
            api,
            self.deals_filter.clone(),
            self.deals_sort.clone(),
        )
    }

    pub fn customers(&self, api: ApiCall) -> ListQuery<Customer> {
        customers::customers_query(
            Arc::clone(&self.queries),
            api,
            self.customers_filter.clone(),
            self.customers_sort.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_PAGE_LIMIT, DefaultScope};
    use serial_test::serial;
    use std::str::FromStr;

    fn context(config: Config) -> AppContext {
        let now = Timestamp::from_str("2026-03-15T12:00:00Z").unwrap();
        AppContext::new_at(config, LocalStorage::in_memory(), now).unwrap()
    }

    #[test]
    #[serial]
    fn test_api_uses_default_scope() {
        let mut config = Config::default();
        config.default_scope = Some(DefaultScope {
            org_id: "acme".to_string(),
            workspace_id: Some("sales".to_string()),
        });
        let ctx = context(config);

        let api = ctx.api(None, None).unwrap();
        assert_eq!(api.scope().to_string(), "acme/sales");

        let api = ctx.api(Some("globex"), None).unwrap();
        assert_eq!(api.scope().to_string(), "globex/sales");
    }

    #[test]
    #[serial]
    fn test_api_without_scope_is_config_error() {
        let ctx = context(Config::default());
        assert!(ctx.api(None, None).is_err());
    }

    #[test]
    #[serial]
    fn test_contexts_do_not_share_stores() {
        let a = context(Config::default());
        let b = context(Config::default());
        a.deals_filter.set_search_text("only in a");
        assert_eq!(b.deals_filter.search_text(), "");
    }

    #[test]
    #[serial]
    fn test_list_queries_share_context_stores() {
        let mut config = Config::default();
        config.default_scope = Some(DefaultScope {
            org_id: "acme".to_string(),
            workspace_id: None,
        });
        let ctx = context(config);
        let api = ctx.api(None, None).unwrap();
        let deals = ctx.deals(api.clone());

        ctx.deals_filter.set_search_text("renewal");
        assert_eq!(deals.key().search, "renewal");

        // The prepared customers body is only sent once the filter is applied
        let customers = ctx.customers(api);
        assert_eq!(customers.request().filter, None);
        let mut criteria = ctx.customers_filter.filter();
        criteria.is_filter_applied = true;
        ctx.customers_filter.set_filter(criteria);
        assert_eq!(customers.request().filter.map(|b| b.limit), Some(20));
    }

    #[test]
    #[serial]
    fn test_fresh_install_uses_default_page_limit() {
        let ctx = context(Config::default());
        assert_eq!(
            ctx.customers_filter.filter().filter_body.map(|b| b.limit),
            Some(DEFAULT_PAGE_LIMIT)
        );

        let args = crate::cli::ListArgs {
            tag: vec!["vip".to_string()],
            ..Default::default()
        };
        let now = Timestamp::from_str("2026-03-15T12:00:00Z").unwrap();
        crate::commands::apply_list_args(&ctx.deals_filter, &ctx.deals_sort, &args, now);
        assert_eq!(
            ctx.deals_filter.request_body().map(|b| b.limit),
            Some(DEFAULT_PAGE_LIMIT)
        );
    }
}
