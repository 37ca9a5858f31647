//! Query builder for the hosted backend's REST data API
//!
//! Filters use the PostgREST operator syntax: `column=eq.value`,
//! `column=is.null`, `column=in.(a,b)`, plus `select`, `order`, `offset` and
//! `limit` modifiers.

use std::fmt::Display;

const MODIFIERS: [&str; 4] = ["select", "order", "offset", "limit"];

/// Query string parameters for one REST call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestQuery {
    params: Vec<(String, String)>,
}

impl RestQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return
    pub fn select(self, columns: &str) -> Self {
        self.push("select", columns.to_string())
    }

    /// `column = value`
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("eq.{}", value))
    }

    /// `column IS NULL`
    pub fn is_null(self, column: &str) -> Self {
        self.push(column, "is.null".to_string())
    }

    /// `column IN (values)`
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        self.push(column, format!("in.({})", values.join(",")))
    }

    /// Sort order
    pub fn order(self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.push("order", format!("{}.{}", column, direction))
    }

    /// Skip the first `offset` rows
    pub fn offset(self, offset: usize) -> Self {
        self.push("offset", offset.to_string())
    }

    /// Return at most `limit` rows
    pub fn limit(self, limit: usize) -> Self {
        self.push("limit", limit.to_string())
    }

    /// Parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Whether the query restricts rows, as opposed to only shaping the result
    pub fn is_filtered(&self) -> bool {
        self.params
            .iter()
            .any(|(key, _)| !MODIFIERS.contains(&key.as_str()))
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }
}
