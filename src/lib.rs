pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod crm;
pub mod error;
pub mod macros;
pub mod paths;
pub mod query;
pub mod storage;
pub mod store;

pub use api::{ApiCall, ApiPath, ApiSettings, Envelope, Page, Scope, create_api_call};
pub use config::Config;
pub use context::AppContext;
pub use error::{ErrorKind, LeadflowError, Result};
pub use query::{EntityKind, ListQuery, ListRequest, QueryClient, QueryKey, QueryState, ResourceQuery};
pub use storage::LocalStorage;
pub use store::{
    DatePreset, DateRange, FilterCriteria, FilterStore, RequestBody, SortDirection, SortKey,
    SortSpec, SortStore, Store,
};
