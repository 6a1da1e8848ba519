// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory evaluation of predicates against JSON documents.
use std::str::FromStr;

use serde_json::Value as JsonValue;

use crate::id::ObjectId;
use crate::predicate::{Predicate, Value};

impl Predicate {
    /// Returns `true` if the document satisfies this predicate.
    ///
    /// Follows the matching rules of document stores: dotted paths descend into nested objects
    /// and lists, a field test against a list matches when any element matches and missing
    /// fields never match.
    pub fn matches(&self, document: &JsonValue) -> bool {
        match self {
            Predicate::True => true,
            Predicate::And(predicates) => predicates.iter().all(|p| p.matches(document)),
            Predicate::Or(predicates) => predicates.iter().any(|p| p.matches(document)),
            Predicate::FieldEq { field, value } => candidates(document, field)
                .into_iter()
                .any(|candidate| value.matches_json(candidate)),
            Predicate::FieldIn { field, values } => candidates(document, field)
                .into_iter()
                .any(|candidate| values.iter().any(|value| value.matches_json(candidate))),
            Predicate::AnyElement { field, predicate } => lookup(document, field)
                .into_iter()
                .filter_map(JsonValue::as_array)
                .flatten()
                .any(|element| predicate.matches(element)),
        }
    }
}

impl Value {
    /// Compare this value with a JSON scalar.
    ///
    /// Object ids match their hex string form as well as the `{"$oid": "..."}` extended JSON
    /// form.
    pub fn matches_json(&self, json: &JsonValue) -> bool {
        match self {
            Value::String(value) => json.as_str() == Some(value.as_str()),
            Value::ObjectId(id) => {
                let hex = match json {
                    JsonValue::String(hex) => Some(hex.as_str()),
                    JsonValue::Object(map) => map.get("$oid").and_then(JsonValue::as_str),
                    _ => None,
                };
                hex.and_then(|hex| ObjectId::from_str(hex).ok())
                    .is_some_and(|other| other == *id)
            }
        }
    }
}

/// Values stored under the dotted path without unwinding the final list.
fn lookup<'a>(document: &'a JsonValue, path: &str) -> Vec<&'a JsonValue> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    walk(document, &segments, false, &mut out);
    out
}

/// Scalar values stored under the dotted path, with lists unwound into their elements.
fn candidates<'a>(document: &'a JsonValue, path: &str) -> Vec<&'a JsonValue> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    walk(document, &segments, true, &mut out);
    out
}

fn walk<'a>(value: &'a JsonValue, segments: &[&str], unwind: bool, out: &mut Vec<&'a JsonValue>) {
    let Some((head, rest)) = segments.split_first() else {
        match value {
            JsonValue::Array(items) if unwind => out.extend(items.iter()),
            _ => out.push(value),
        }
        return;
    };

    match value {
        JsonValue::Object(map) => {
            if let Some(next) = map.get(*head) {
                walk(next, rest, unwind, out);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                walk(item, segments, unwind, out);
            }
        }
        _ => (),
    }
}
