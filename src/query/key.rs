//! Cache keys for queries.
//!
//! A key captures everything that changes what the backend returns: entity,
//! scope, request body, sort and search text.

use std::fmt;

use serde::Serialize;

use crate::api::Scope;
use crate::store::{FilterStore, SortSpec, SortStore};

/// Kind of backend resource a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Deals,
    Customers,
    Workspaces,
    WorkspaceSettings,
    Subscription,
    CallScripts,
}

crate::enum_display!(EntityKind, {
    Deals => "deals",
    Customers => "customers",
    Workspaces => "workspaces",
    WorkspaceSettings => "workspace-settings",
    Subscription => "subscription",
    CallScripts => "call-scripts",
});

/// Cache identity of one fetch.
///
/// Two keys are equal exactly when they were derived from the same entity,
/// scope, request parameters, sort and search text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub entity: EntityKind,
    pub scope: Scope,
    /// Canonical JSON of the request parameters (`null` when absent)
    pub params: String,
    pub sort: String,
    pub search: String,
}

impl QueryKey {
    pub fn new(entity: EntityKind, scope: &Scope) -> Self {
        Self {
            entity,
            scope: scope.clone(),
            params: "null".to_string(),
            sort: String::new(),
            search: String::new(),
        }
    }

    /// Key for a list view, derived from the current store state.
    pub fn for_list(
        entity: EntityKind,
        scope: &Scope,
        filter: &FilterStore,
        sort: &SortStore,
    ) -> Self {
        Self::new(entity, scope)
            .with_params(&filter.request_body())
            .with_sort(&sort.sort())
            .with_search(&filter.search_text())
    }

    pub fn with_params<P: Serialize + ?Sized>(mut self, params: &P) -> Self {
        self.params = serde_json::to_string(params).unwrap_or_else(|_| "null".to_string());
        self
    }

    pub fn with_sort(mut self, sort: &SortSpec) -> Self {
        self.sort = sort.to_string();
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.trim().to_string();
        self
    }

    /// True when this key reads `entity` within `scope`, whatever its parameters.
    pub fn targets(&self, entity: EntityKind, scope: &Scope) -> bool {
        self.entity == entity && &self.scope == scope
    }

    /// True when a write to `entity` made in `scope` can change what this key
    /// reads.
    ///
    /// Organization-wide views include every workspace, so a write in one
    /// workspace reaches them as well as that workspace's own views. A write
    /// made without a workspace reaches every view in the organization.
    pub fn overlaps(&self, entity: EntityKind, scope: &Scope) -> bool {
        self.entity == entity
            && self.scope.org_id == scope.org_id
            && (scope.workspace_id.is_none()
                || self.scope.workspace_id.is_none()
                || self.scope.workspace_id == scope.workspace_id)
    }

    /// True when this key reads `entity` anywhere in the organization.
    pub fn targets_org(&self, entity: EntityKind, org_id: &str) -> bool {
        self.entity == entity && self.scope.org_id == org_id
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.entity, self.scope)?;
        if self.params != "null" {
            write!(f, " params={}", self.params)?;
        }
        if !self.sort.is_empty() {
            write!(f, " sort={}", self.sort)?;
        }
        if !self.search.is_empty() {
            write!(f, " q={}", self.search)?;
        }
        Ok(())
    }
}
