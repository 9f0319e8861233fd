//! Sort specification for list views.
//!
//! The specification is passed through to the backend; column names are not
//! checked locally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Store;
use crate::error::LeadflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

crate::enum_display_fromstr!(
    SortDirection,
    LeadflowError::InvalidSortDirection,
    {
        Asc => "asc",
        Desc => "desc",
    }
);

/// One `(column, direction)` pair.
///
/// Serialized as a two-element array: `["created_at", "desc"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, SortDirection)", into = "(String, SortDirection)")]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

impl From<(String, SortDirection)> for SortKey {
    fn from((column, direction): (String, SortDirection)) -> Self {
        Self { column, direction }
    }
}

impl From<SortKey> for (String, SortDirection) {
    fn from(key: SortKey) -> Self {
        (key.column, key.direction)
    }
}

/// Ordered sort keys; earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }

    /// Newest first, the default for every list view.
    pub fn newest_first() -> Self {
        Self(vec![SortKey::desc("created_at")])
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn then(mut self, key: SortKey) -> Self {
        self.0.push(key);
        self
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", key.column, key.direction)?;
        }
        Ok(())
    }
}

/// Parses `column[:direction][,column[:direction]...]`; direction defaults to `asc`.
impl FromStr for SortSpec {
    type Err = LeadflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }

        s.split(',')
            .map(|part| {
                let (column, direction) = match part.split_once(':') {
                    Some((column, direction)) => {
                        (column.trim(), direction.parse::<SortDirection>()?)
                    }
                    None => (part.trim(), SortDirection::Asc),
                };
                if column.is_empty() {
                    return Err(LeadflowError::InvalidSort(s.to_string()));
                }
                Ok(SortKey::new(column, direction))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Sort state for one list view.
#[derive(Debug, Clone)]
pub struct SortStore {
    spec: Store<SortSpec>,
}

impl SortStore {
    pub fn new(spec: SortSpec) -> Self {
        Self {
            spec: Store::new(spec),
        }
    }

    pub fn sort(&self) -> SortSpec {
        self.spec.get()
    }

    /// Replace the sort specification wholesale.
    pub fn set_sort(&self, spec: SortSpec) {
        self.spec.set(spec);
    }

    pub fn spec_store(&self) -> &Store<SortSpec> {
        &self.spec
    }
}

impl Default for SortStore {
    fn default() -> Self {
        Self::new(SortSpec::newest_first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let spec = SortSpec::newest_first().then(SortKey::asc("amount"));
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!([["created_at", "desc"], ["amount", "asc"]])
        );

        let parsed: SortSpec = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn test_parse_text_form() {
        let spec: SortSpec = "stage:DESC, amount".parse().unwrap();
        assert_eq!(
            spec.keys(),
            &[SortKey::desc("stage"), SortKey::asc("amount")]
        );
        assert_eq!(spec.to_string(), "stage:desc,amount:asc");
    }

    #[test]
    fn test_parse_empty_is_empty_spec() {
        let spec: SortSpec = "  ".parse().unwrap();
        assert!(spec.is_empty());
        assert_eq!(spec.to_string(), "");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(matches!(
            ":desc".parse::<SortSpec>(),
            Err(LeadflowError::InvalidSort(_))
        ));
        assert!(matches!(
            "amount:sideways".parse::<SortSpec>(),
            Err(LeadflowError::InvalidSortDirection(_))
        ));
    }

    #[test]
    fn test_unknown_columns_pass_through() {
        let store = SortStore::default();
        let spec: SortSpec = "no_such_column:asc".parse().unwrap();
        store.set_sort(spec.clone());
        assert_eq!(store.sort(), spec);
    }

    #[test]
    fn test_set_sort_replaces_wholesale() {
        let store = SortStore::default();
        store.set_sort(SortSpec::new(vec![SortKey::asc("name")]));
        store.set_sort(SortSpec::new(vec![SortKey::desc("amount")]));
        assert_eq!(store.sort().keys(), &[SortKey::desc("amount")]);
    }
}
