//! Search Queries and Filters
//!
//! TigerStyle: Queries are data. Backends translate or evaluate them.
//!
//! A remote backend turns a [`Filter`] into its own query language. The
//! simulated backend evaluates it directly against anything implementing
//! [`Getter`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// =============================================================================
// Getter
// =============================================================================

/// Field access used to evaluate filters against a value.
pub trait Getter {
    /// Get a string field by name.
    fn get_field_string(&self, field: &str) -> Option<String>;

    /// Get an integer field by name.
    fn get_field_i64(&self, field: &str) -> Option<i64>;
}

// =============================================================================
// Filter
// =============================================================================

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum Filter {
    /// String field equals value
    TermString { key: String, value: String },
    /// Integer field equals value
    TermInt { key: String, value: i64 },
    /// Integer field greater than value
    Gt { key: String, value: i64 },
    /// Integer field greater than or equal to value
    Gte { key: String, value: i64 },
    /// Integer field less than value
    Lt { key: String, value: i64 },
    /// Integer field less than or equal to value
    Lte { key: String, value: i64 },
    /// All sub-filters match
    And(Vec<Filter>),
    /// Any sub-filter matches
    Or(Vec<Filter>),
    /// Sub-filter does not match
    Not(Box<Filter>),
}

impl Filter {
    /// String equality.
    #[must_use]
    pub fn term(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TermString {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Integer equality.
    #[must_use]
    pub fn term_int(key: impl Into<String>, value: i64) -> Self {
        Self::TermInt {
            key: key.into(),
            value,
        }
    }

    /// Inclusive integer range `[from, to]`.
    #[must_use]
    pub fn range(key: impl Into<String>, from: i64, to: i64) -> Self {
        let key = key.into();
        Self::And(vec![
            Self::Gte {
                key: key.clone(),
                value: from,
            },
            Self::Lte { key, value: to },
        ])
    }

    /// Evaluate against a value. Missing fields never match.
    #[must_use]
    pub fn eval(&self, value: &dyn Getter) -> bool {
        match self {
            Self::TermString { key, value: want } => {
                value.get_field_string(key).is_some_and(|got| &got == want)
            }
            Self::TermInt { key, value: want } => value.get_field_i64(key) == Some(*want),
            Self::Gt { key, value: bound } => value.get_field_i64(key).is_some_and(|v| v > *bound),
            Self::Gte { key, value: bound } => {
                value.get_field_i64(key).is_some_and(|v| v >= *bound)
            }
            Self::Lt { key, value: bound } => value.get_field_i64(key).is_some_and(|v| v < *bound),
            Self::Lte { key, value: bound } => {
                value.get_field_i64(key).is_some_and(|v| v <= *bound)
            }
            Self::And(filters) => filters.iter().all(|f| f.eval(value)),
            Self::Or(filters) => filters.iter().any(|f| f.eval(value)),
            Self::Not(filter) => !filter.eval(value),
        }
    }
}

// =============================================================================
// Search Query
// =============================================================================

/// Result window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Range {
    /// First index included
    pub from: usize,
    /// First index excluded
    pub to: usize,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl SortOrder {
    /// Apply this direction to an ascending ordering.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A flow search request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchQuery {
    /// Flows must match this filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Result window applied after sorting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_range: Option<Range>,
    /// Whether results are sorted
    pub sort: bool,
    /// Field to sort on
    #[serde(default)]
    pub sort_by: String,
    /// Sort direction
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Keep a single flow per tracking ID
    pub dedup: bool,
}

impl SearchQuery {
    /// Query matching everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Query matching the given filter.
    #[must_use]
    pub fn with_filter(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Sort results by a field.
    #[must_use]
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = true;
        self.sort_by = field.into();
        self.sort_order = order;
        self
    }

    /// Restrict results to `[from, to)`.
    ///
    /// # Panics
    /// Panics if `to` is before `from`.
    #[must_use]
    pub fn paginated(mut self, from: usize, to: usize) -> Self {
        assert!(from <= to, "pagination from ({from}) exceeds to ({to})");
        self.pagination_range = Some(Range { from, to });
        self
    }

    /// Keep one flow per tracking ID.
    #[must_use]
    pub fn deduplicated(mut self) -> Self {
        self.dedup = true;
        self
    }

    /// True if the value matches this query's filter.
    #[must_use]
    pub fn matches(&self, value: &dyn Getter) -> bool {
        self.filter.as_ref().map_or(true, |f| f.eval(value))
    }
}
