//! Typed models and endpoint helpers for the CRM backend.
//!
//! Reads are exposed as [`ListQuery`](crate::query::ListQuery) or
//! [`ResourceQuery`](crate::query::ResourceQuery) bindings. Writes go through
//! [`QueryClient::mutate`](crate::query::QueryClient::mutate) and invalidate
//! the reads they affect.

pub mod billing;
pub mod campaigns;
pub mod customers;
pub mod deals;
pub mod session;
pub mod workspaces;

pub use billing::{PlanChange, Subscription};
pub use campaigns::{CallScript, ScriptUpdate};
pub use customers::{Customer, NewCustomer};
pub use deals::{Deal, DealStatus, DealUpdate, NewDeal};
pub use session::{OtpChallenge, Session};
pub use workspaces::{SettingsUpdate, Workspace, WorkspaceSettings};
