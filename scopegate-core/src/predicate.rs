// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-agnostic boolean predicate trees.
//!
//! Access filters are expressed as a small tree of `AND` / `OR` nodes over field tests. Stores
//! lower the tree into their own query language (see [`Predicate::to_mongo`]) or evaluate it
//! directly against documents (see [`Predicate::matches`]).
use std::fmt;

use crate::id::ObjectId;

/// Literal value a field is compared against.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    String(String),
    ObjectId(ObjectId),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(value) => write!(f, "{value:?}"),
            Value::ObjectId(id) => write!(f, "ObjectId({id})"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::ObjectId(value)
    }
}

/// Boolean predicate over a document.
///
/// Field names are dotted paths (`data.customerCode`). A field test against a list field matches
/// when any element of the list matches. An empty `And` is true, an empty `Or` is false.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// The empty predicate, matches every document.
    True,

    /// All inner predicates must match.
    And(Vec<Predicate>),

    /// At least one inner predicate must match.
    Or(Vec<Predicate>),

    /// Field equals the value.
    FieldEq { field: String, value: Value },

    /// Field equals one of the values.
    FieldIn { field: String, values: Vec<Value> },

    /// At least one element of the list field matches the inner predicate on its own.
    ///
    /// Paths inside the inner predicate are relative to the list element. This keeps tests on
    /// several fields of the same element together, which two independent field tests on the
    /// list would not.
    AnyElement {
        field: String,
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::FieldEq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field_in<V>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        Predicate::FieldIn {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn any_element(field: impl Into<String>, predicate: Predicate) -> Self {
        Predicate::AnyElement {
            field: field.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Returns `true` if this is the empty predicate, placing no restriction on a query.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Predicate::True)
    }

    /// Combine this predicate with another one so both must hold.
    ///
    /// Used by callers to put their own business filters (search, type, pagination bounds) on
    /// top of an access filter. The empty predicate is the identity.
    pub fn and_with(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::True, other) => other,
            (this, Predicate::True) => this,
            (this, other) => Predicate::And(vec![this, other]),
        }
    }

    /// Number of direct branches of an `Or` node, `0` for every other node.
    pub fn branch_count(&self) -> usize {
        match self {
            Predicate::Or(branches) => branches.len(),
            _ => 0,
        }
    }
}
