//! Declarative selector construction for the `_find` endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Comparison operators understood by the remote `_find` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Regex,
}

impl Operator {
    /// The wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Regex => "$regex",
        }
    }
}

/// Sort direction for a sort contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// The wire name of the direction
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Typed reference to a field of a document type
///
/// Declared as consts on the document type, so selector construction is
/// checked at compile time without any runtime reflection:
///
/// ```ignore
/// impl User {
///     const AGE: Field<User, u32> = Field::new("age");
/// }
/// ```
pub struct Field<D, V> {
    name: &'static str,
    _marker: PhantomData<fn(&D) -> V>,
}

impl<D, V> Field<D, V> {
    /// Create a field reference with the given wire name
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The field's wire name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<D, V> Clone for Field<D, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, V> Copy for Field<D, V> {}

/// Declarative query descriptor sent as the body of a `_find` request
///
/// Immutable snapshot produced by [`SelectionBuilder::build`]. Absent
/// options are omitted from the wire form.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub selector: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<BTreeMap<String, String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_index: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<String>,
}

/// Envelope of a `_find` reply
#[derive(Debug, Deserialize)]
pub struct FindResponse<D> {
    pub docs: Vec<D>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// Accumulate-only builder translating typed field references into a
/// [`Selection`]
///
/// A second operator contributed for an already-present field merges into
/// that field's operator map, so `gt` then `lt` on one field is a single
/// conjunction entry. Sort contributions append in call order. Conflicting
/// operators are not validated here; the server sees them as-is.
pub struct SelectionBuilder<D> {
    selector: BTreeMap<String, BTreeMap<String, Value>>,
    sort: Vec<BTreeMap<String, String>>,
    fields: Option<Vec<String>>,
    limit: Option<u64>,
    skip: Option<u64>,
    use_index: Option<Vec<String>>,
    bookmark: Option<String>,
    update: Option<bool>,
    stable: Option<bool>,
    stale: Option<String>,
    _marker: PhantomData<fn() -> D>,
}

impl<D> SelectionBuilder<D> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            selector: BTreeMap::new(),
            sort: Vec::new(),
            fields: None,
            limit: None,
            skip: None,
            use_index: None,
            bookmark: None,
            update: None,
            stable: None,
            stale: None,
            _marker: PhantomData,
        }
    }

    /// Require `field == value`
    pub fn eq<V, U>(self, field: Field<D, V>, value: U) -> Self
    where
        V: Serialize,
        U: Into<V>,
    {
        self.operator(field.name(), Operator::Eq, value.into())
    }

    /// Require `field != value`
    pub fn ne<V, U>(self, field: Field<D, V>, value: U) -> Self
    where
        V: Serialize,
        U: Into<V>,
    {
        self.operator(field.name(), Operator::Ne, value.into())
    }

    /// Require `field < value`
    pub fn lt<V, U>(self, field: Field<D, V>, value: U) -> Self
    where
        V: Serialize,
        U: Into<V>,
    {
        self.operator(field.name(), Operator::Lt, value.into())
    }

    /// Require `field <= value`
    pub fn lte<V, U>(self, field: Field<D, V>, value: U) -> Self
    where
        V: Serialize,
        U: Into<V>,
    {
        self.operator(field.name(), Operator::Lte, value.into())
    }

    /// Require `field > value`
    pub fn gt<V, U>(self, field: Field<D, V>, value: U) -> Self
    where
        V: Serialize,
        U: Into<V>,
    {
        self.operator(field.name(), Operator::Gt, value.into())
    }

    /// Require `field >= value`
    pub fn gte<V, U>(self, field: Field<D, V>, value: U) -> Self
    where
        V: Serialize,
        U: Into<V>,
    {
        self.operator(field.name(), Operator::Gte, value.into())
    }

    /// Require the string field to match the given regular expression
    pub fn regex(self, field: Field<D, String>, pattern: impl Into<String>) -> Self {
        self.operator(field.name(), Operator::Regex, pattern.into())
    }

    fn operator<V: Serialize>(mut self, field: &str, op: Operator, value: V) -> Self {
        // Values that cannot be represented in JSON degrade to null
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.selector
            .entry(field.to_string())
            .or_default()
            .insert(op.as_str().to_string(), value);
        self
    }

    /// Append a sort contribution; call order is preserved on the wire
    pub fn sort<V>(mut self, field: Field<D, V>, order: SortOrder) -> Self {
        let mut entry = BTreeMap::new();
        entry.insert(field.name().to_string(), order.as_str().to_string());
        self.sort.push(entry);
        self
    }

    /// Project only the named fields in the result documents
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Maximum number of documents to return
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of matching documents to skip
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Instruct the server to answer from the named index
    pub fn use_index<I, S>(mut self, index: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.use_index = Some(index.into_iter().map(Into::into).collect());
        self
    }

    /// Resume a paginated query from a server-issued bookmark
    pub fn bookmark(mut self, bookmark: impl Into<String>) -> Self {
        self.bookmark = Some(bookmark.into());
        self
    }

    /// Pass the `update` execution hint through to the server
    pub fn update(mut self, update: bool) -> Self {
        self.update = Some(update);
        self
    }

    /// Pass the `stable` execution hint through to the server
    pub fn stable(mut self, stable: bool) -> Self {
        self.stable = Some(stable);
        self
    }

    /// Pass the `stale` execution hint through to the server
    pub fn stale(mut self, stale: impl Into<String>) -> Self {
        self.stale = Some(stale.into());
        self
    }

    /// Produce the immutable query descriptor
    pub fn build(self) -> Selection {
        Selection {
            selector: self.selector,
            limit: self.limit,
            skip: self.skip,
            sort: if self.sort.is_empty() {
                None
            } else {
                Some(self.sort)
            },
            fields: self.fields,
            use_index: self.use_index,
            bookmark: self.bookmark,
            update: self.update,
            stable: self.stable,
            stale: self.stale,
        }
    }
}

impl<D> Default for SelectionBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}
