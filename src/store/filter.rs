//! Filter criteria for list views and the request body derived from them.

use std::collections::BTreeSet;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use super::Store;
use crate::config::DEFAULT_PAGE_LIMIT;
use crate::error::LeadflowError;

/// Rolling date windows offered by list views.
///
/// Serialized as the backend's preset codes (days relative to now).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DatePreset {
    #[serde(rename = "-7")]
    Last7Days,
    #[serde(rename = "-30")]
    Last30Days,
    #[serde(rename = "-90")]
    Last90Days,
    #[serde(rename = "-365")]
    LastYear,
    #[default]
    #[serde(rename = "-9999")]
    AllTime,
    /// Dates picked explicitly by the user.
    #[serde(rename = "custom")]
    Custom,
}

impl DatePreset {
    pub const ALL_STRINGS: &[&str] = &["-7", "-30", "-90", "-365", "-9999", "custom"];

    /// Length of the window in days, or `None` for a custom range.
    pub fn days(self) -> Option<i64> {
        match self {
            DatePreset::Last7Days => Some(7),
            DatePreset::Last30Days => Some(30),
            DatePreset::Last90Days => Some(90),
            DatePreset::LastYear => Some(365),
            DatePreset::AllTime => Some(9999),
            DatePreset::Custom => None,
        }
    }

    /// Window ending at `now`, or `None` for a custom range.
    pub fn window(self, now: Timestamp) -> Option<DateRange> {
        let days = self.days()?;
        let from = now
            .checked_sub(SignedDuration::from_hours(days * 24))
            .unwrap_or(Timestamp::MIN);
        Some(DateRange { from, to: now })
    }
}

crate::enum_display_fromstr!(
    DatePreset,
    LeadflowError::InvalidDatePreset,
    {
        Last7Days => "-7",
        Last30Days => "-30",
        Last90Days => "-90",
        LastYear => "-365",
        AllTime => "-9999",
        Custom => "custom",
    }
);

/// Closed time interval with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    from: Timestamp,
    to: Timestamp,
}

impl DateRange {
    /// Build a range from two instants in either order.
    pub fn new(a: Timestamp, b: Timestamp) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    pub fn from(&self) -> Timestamp {
        self.from
    }

    pub fn to(&self) -> Timestamp {
        self.to
    }
}

/// Body sent verbatim to list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// ISO-8601 start of the window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// ISO-8601 end of the window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assign_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<u32>,
}

impl RequestBody {
    /// Pagination-only body.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            page: None,
            from: None,
            to: None,
            tags: Vec::new(),
            assign_to: Vec::new(),
            categories: Vec::new(),
            sources: Vec::new(),
            status: Vec::new(),
        }
    }
}

/// User-selected narrowing parameters for one list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub date_selected: DatePreset,
    pub from: Timestamp,
    pub to: Timestamp,
    pub tag_selected: BTreeSet<String>,
    pub assign_to: BTreeSet<String>,
    pub category_selected: BTreeSet<String>,
    pub source_selected: BTreeSet<String>,
    pub status_selected: BTreeSet<u32>,
    /// Distinguishes "no filter chosen" from "empty filter chosen".
    pub is_filter_applied: bool,
    pub filter_body: Option<RequestBody>,
}

impl FilterCriteria {
    /// Unfiltered criteria with the window of `preset` ending at `now`.
    pub fn new(preset: DatePreset, now: Timestamp) -> Self {
        let range = preset
            .window(now)
            .unwrap_or_else(|| DateRange::new(now, now));
        Self {
            date_selected: preset,
            from: range.from,
            to: range.to,
            tag_selected: BTreeSet::new(),
            assign_to: BTreeSet::new(),
            category_selected: BTreeSet::new(),
            source_selected: BTreeSet::new(),
            status_selected: BTreeSet::new(),
            is_filter_applied: false,
            filter_body: None,
        }
    }

    /// Select a preset and recompute `from`/`to` from it.
    ///
    /// Selecting [`DatePreset::Custom`] keeps the current dates.
    pub fn with_preset(mut self, preset: DatePreset, now: Timestamp) -> Self {
        self.date_selected = preset;
        if let Some(range) = preset.window(now) {
            self.from = range.from;
            self.to = range.to;
        }
        self
    }

    /// Override the window with explicit dates, in either order.
    pub fn with_range(mut self, a: Timestamp, b: Timestamp) -> Self {
        let range = DateRange::new(a, b);
        self.date_selected = DatePreset::Custom;
        self.from = range.from;
        self.to = range.to;
        self
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.from, self.to)
    }

    /// Body built from the criteria fields alone.
    pub fn derive_body(&self, limit: u32) -> RequestBody {
        let range = self.date_range();
        RequestBody {
            limit,
            page: None,
            from: Some(range.from.to_string()),
            to: Some(range.to.to_string()),
            tags: self.tag_selected.iter().cloned().collect(),
            assign_to: self.assign_to.iter().cloned().collect(),
            categories: self.category_selected.iter().cloned().collect(),
            sources: self.source_selected.iter().cloned().collect(),
            status: self.status_selected.iter().copied().collect(),
        }
    }

    /// Body to send, or `None` to let the server apply its default.
    ///
    /// An explicitly stored `filter_body` is sent as-is once the filter is
    /// applied; otherwise the body is derived from the criteria.
    pub fn request_body(&self, limit: u32) -> Option<RequestBody> {
        if !self.is_filter_applied {
            return None;
        }
        Some(
            self.filter_body
                .clone()
                .unwrap_or_else(|| self.derive_body(limit)),
        )
    }
}

/// Filter state for one list view.
#[derive(Debug, Clone)]
pub struct FilterStore {
    criteria: Store<FilterCriteria>,
    search_text: Store<String>,
    page_limit: u32,
}

impl FilterStore {
    pub fn new(criteria: FilterCriteria, page_limit: u32) -> Self {
        Self {
            criteria: Store::new(criteria),
            search_text: Store::new(String::new()),
            page_limit,
        }
    }

    /// Deals view: unbounded window, open deals only, no request body.
    pub fn deals() -> Self {
        Self::deals_at(Timestamp::now(), DEFAULT_PAGE_LIMIT)
    }

    pub fn deals_at(now: Timestamp, page_limit: u32) -> Self {
        let mut criteria = FilterCriteria::new(DatePreset::AllTime, now);
        criteria.status_selected.insert(1);
        Self::new(criteria, page_limit)
    }

    /// Customers view: last 30 days with a prepared pagination body.
    pub fn customers() -> Self {
        Self::customers_at(Timestamp::now(), DEFAULT_PAGE_LIMIT)
    }

    pub fn customers_at(now: Timestamp, page_limit: u32) -> Self {
        let mut criteria = FilterCriteria::new(DatePreset::Last30Days, now);
        let mut body = RequestBody::with_limit(page_limit);
        body.from = Some(criteria.from.to_string());
        body.to = Some(criteria.to.to_string());
        criteria.filter_body = Some(body);
        Self::new(criteria, page_limit)
    }

    pub fn filter(&self) -> FilterCriteria {
        self.criteria.get()
    }

    /// Replace the whole criteria. Nothing is merged.
    pub fn set_filter(&self, criteria: FilterCriteria) {
        self.criteria.set(criteria);
    }

    pub fn search_text(&self) -> String {
        self.search_text.get()
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.search_text.set(text.into());
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    pub fn request_body(&self) -> Option<RequestBody> {
        let limit = self.page_limit;
        self.criteria.read(|c| c.request_body(limit))
    }

    pub fn criteria_store(&self) -> &Store<FilterCriteria> {
        &self.criteria
    }

    pub fn search_store(&self) -> &Store<String> {
        &self.search_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn now() -> Timestamp {
        Timestamp::from_str("2026-03-15T12:00:00Z").unwrap()
    }

    #[test]
    fn test_every_preset_window_is_ordered() {
        for code in DatePreset::ALL_STRINGS {
            let preset = DatePreset::from_str(code).unwrap();
            let store = FilterStore::deals_at(now(), 20);
            store.set_filter(store.filter().with_preset(preset, now()));
            let c = store.filter();
            assert!(c.from <= c.to, "preset {code} produced from > to");
            assert_eq!(c.date_selected, preset);
        }
    }

    #[test]
    fn test_preset_recomputes_dates() {
        let c = FilterCriteria::new(DatePreset::AllTime, now()).with_preset(DatePreset::Last7Days, now());
        assert_eq!(c.to, now());
        assert_eq!(c.from, Timestamp::from_str("2026-03-08T12:00:00Z").unwrap());
    }

    #[test]
    fn test_custom_range_is_normalized() {
        let early = Timestamp::from_str("2026-01-01T00:00:00Z").unwrap();
        let late = Timestamp::from_str("2026-02-01T00:00:00Z").unwrap();
        let c = FilterCriteria::new(DatePreset::Last30Days, now()).with_range(late, early);
        assert_eq!(c.date_selected, DatePreset::Custom);
        assert_eq!(c.from, early);
        assert_eq!(c.to, late);

        // Selecting "custom" afterwards keeps the picked dates
        let kept = c.clone().with_preset(DatePreset::Custom, now());
        assert_eq!(kept.from, early);
        assert_eq!(kept.to, late);
    }

    #[test]
    fn test_set_filter_returns_exact_value() {
        let store = FilterStore::customers_at(now(), 20);
        let mut written = store.filter();
        written.tag_selected.insert("vip".to_string());
        written.filter_body = None;
        store.set_filter(written.clone());
        assert_eq!(store.filter(), written);
    }

    #[test]
    fn test_set_filter_does_not_merge() {
        let store = FilterStore::deals_at(now(), 20);
        let replacement = FilterCriteria::new(DatePreset::Last7Days, now());
        store.set_filter(replacement);
        // status {1} from the default is gone: the write replaced everything
        assert!(store.filter().status_selected.is_empty());
    }

    #[test]
    fn test_request_body_null_when_not_applied() {
        let store = FilterStore::customers_at(now(), 20);
        assert!(store.filter().filter_body.is_some());
        assert!(!store.filter().is_filter_applied);
        assert_eq!(store.request_body(), None);
    }

    #[test]
    fn test_request_body_derived_when_applied_without_body() {
        let store = FilterStore::deals_at(now(), 50);
        let mut c = store.filter().with_preset(DatePreset::Last30Days, now());
        c.is_filter_applied = true;
        c.tag_selected.insert("hot".to_string());
        store.set_filter(c);

        let body = store.request_body().unwrap();
        assert_eq!(body.limit, 50);
        assert_eq!(body.status, vec![1]);
        assert_eq!(body.tags, vec!["hot".to_string()]);
        assert_eq!(body.from.as_deref(), Some("2026-02-13T12:00:00Z"));
        assert_eq!(body.to.as_deref(), Some("2026-03-15T12:00:00Z"));
    }

    #[test]
    fn test_default_deals_store_scenario() {
        let store = FilterStore::deals();
        let current = store.filter();
        assert_eq!(current.status_selected, BTreeSet::from([1]));
        assert_eq!(current.filter_body, None);
        assert!(!current.is_filter_applied);
        assert_eq!(current.date_selected, DatePreset::AllTime);

        store.set_filter(FilterCriteria {
            is_filter_applied: true,
            filter_body: Some(RequestBody::with_limit(20)),
            ..current
        });

        let updated = store.filter();
        assert!(updated.is_filter_applied);
        assert_eq!(updated.filter_body.as_ref().map(|b| b.limit), Some(20));
        assert_eq!(store.request_body(), Some(RequestBody::with_limit(20)));
    }

    #[test]
    fn test_customers_default_window() {
        let store = FilterStore::customers_at(now(), 20);
        let c = store.filter();
        assert_eq!(c.date_selected, DatePreset::Last30Days);
        assert!(c.status_selected.is_empty());
        let body = c.filter_body.unwrap();
        assert_eq!(body.limit, 20);
        assert_eq!(body.from, Some(c.from.to_string()));
    }

    #[test]
    fn test_search_text_is_independent() {
        let store = FilterStore::deals_at(now(), 20);
        let before = store.filter();
        store.set_search_text("acme");
        assert_eq!(store.search_text(), "acme");
        assert_eq!(store.filter(), before);
    }

    #[test]
    fn test_request_body_serialization_omits_empty_fields() {
        let json = serde_json::to_value(RequestBody::with_limit(20)).unwrap();
        assert_eq!(json, serde_json::json!({ "limit": 20 }));

        let mut body = RequestBody::with_limit(10);
        body.assign_to = vec!["u1".to_string()];
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({ "limit": 10, "assignTo": ["u1"] }));
    }

    #[test]
    fn test_date_preset_codes() {
        assert_eq!(DatePreset::Last30Days.to_string(), "-30");
        assert_eq!(DatePreset::from_str("-9999").unwrap(), DatePreset::AllTime);
        assert_eq!(
            serde_json::to_string(&DatePreset::Last90Days).unwrap(),
            "\"-90\""
        );
        assert!(matches!(
            DatePreset::from_str("-31"),
            Err(LeadflowError::InvalidDatePreset(_))
        ));
    }
}
