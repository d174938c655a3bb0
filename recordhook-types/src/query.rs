//! Query shapes carried by a bulk retrieve.
//!
//! A `RetrieveMultiple` event hands its query to the callback mutably, so a
//! plugin can rewrite it (add a condition, cap the page size) before the host
//! executes it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Any query the host may attach to a bulk retrieve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Query {
    Expression(QueryExpression),
    Fetch(FetchExpression),
}

impl Query {
    /// Logical name of the queried entity, if it can be determined.
    pub fn entity_name(&self) -> Option<&str> {
        match self {
            Self::Expression(q) => Some(q.entity_name.as_str()),
            Self::Fetch(f) => f.entity_name(),
        }
    }

    pub fn as_expression_mut(&mut self) -> Option<&mut QueryExpression> {
        match self {
            Self::Expression(q) => Some(q),
            Self::Fetch(_) => None,
        }
    }
}

impl From<QueryExpression> for Query {
    fn from(query: QueryExpression) -> Self {
        Self::Expression(query)
    }
}

impl From<FetchExpression> for Query {
    fn from(fetch: FetchExpression) -> Self {
        Self::Fetch(fetch)
    }
}

/// Structured query over a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExpression {
    pub entity_name: String,
    #[serde(default)]
    pub column_set: ColumnSet,
    #[serde(default)]
    pub criteria: FilterExpression,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<OrderExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_count: Option<u32>,
    #[serde(default)]
    pub distinct: bool,
}

impl QueryExpression {
    #[must_use]
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into().to_lowercase(),
            column_set: ColumnSet::default(),
            criteria: FilterExpression::default(),
            orders: Vec::new(),
            top_count: None,
            distinct: false,
        }
    }

    /// Adds a condition to the top-level filter.
    pub fn add_condition(
        &mut self,
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        values: Vec<serde_json::Value>,
    ) {
        self.criteria
            .conditions
            .push(ConditionExpression::new(attribute_name, operator, values));
    }

    pub fn add_order(&mut self, attribute_name: impl Into<String>, order_type: OrderType) {
        self.orders.push(OrderExpression {
            attribute_name: attribute_name.into().to_lowercase(),
            order_type,
        });
    }
}

/// Columns to return. An empty, non-`all_columns` set returns only ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet {
    #[serde(default)]
    pub all_columns: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

impl ColumnSet {
    #[must_use]
    pub fn all() -> Self {
        Self {
            all_columns: true,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all_columns: false,
            columns: columns.into_iter().map(|c| c.into().to_lowercase()).collect(),
        }
    }

    pub fn includes(&self, column: &str) -> bool {
        self.all_columns || self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// A tree of conditions joined by one logical operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    #[serde(default)]
    pub filter_operator: LogicalOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionExpression>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterExpression>,
}

impl FilterExpression {
    #[must_use]
    pub fn new(filter_operator: LogicalOperator) -> Self {
        Self {
            filter_operator,
            conditions: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.filters.iter().all(FilterExpression::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionExpression {
    pub attribute_name: String,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<serde_json::Value>,
}

impl ConditionExpression {
    #[must_use]
    pub fn new(
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        values: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            attribute_name: attribute_name.into().to_lowercase(),
            operator,
            values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    Like,
    In,
    Null,
    NotNull,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::GreaterThan => "gt",
            Self::LessThan => "lt",
            Self::Like => "like",
            Self::In => "in",
            Self::Null => "null",
            Self::NotNull => "not-null",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionOperator {
    type Err = crate::Error;

    /// Accepts the fetch-style short names (`eq`, `ne`, `not-null`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Ok(Self::Equal),
            "ne" | "neq" => Ok(Self::NotEqual),
            "gt" => Ok(Self::GreaterThan),
            "lt" => Ok(Self::LessThan),
            "like" => Ok(Self::Like),
            "in" => Ok(Self::In),
            "null" => Ok(Self::Null),
            "not-null" => Ok(Self::NotNull),
            _ => Err(crate::Error::UnknownOperator(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExpression {
    pub attribute_name: String,
    #[serde(default)]
    pub order_type: OrderType,
}

/// Raw fetch XML. The core does not parse it beyond locating the entity name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchExpression {
    pub query: String,
}

impl FetchExpression {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Value of the `name` attribute on the first `<entity>` element.
    pub fn entity_name(&self) -> Option<&str> {
        let start = self.query.find("<entity")? + "<entity".len();
        let rest = &self.query[start..];
        // `<entity-foo>` is a different element
        if !rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
            return None;
        }
        let tag = &rest[..rest.find('>')?];

        let mut search = 0;
        while let Some(found) = tag[search..].find("name") {
            let at = search + found;
            search = at + "name".len();
            if !tag[..at].ends_with(char::is_whitespace) {
                continue;
            }
            let Some(after_eq) = tag[search..].trim_start().strip_prefix('=') else {
                continue;
            };
            let quoted = after_eq.trim_start();
            let quote = quoted.chars().next().filter(|c| *c == '"' || *c == '\'')?;
            let body = &quoted[1..];
            let end = body.find(quote)?;
            return Some(&body[..end]);
        }
        None
    }
}
