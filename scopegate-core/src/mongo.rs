// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lowering of predicate trees into MongoDB query documents.
use serde_json::{Map, Value as JsonValue, json};

use crate::predicate::{Predicate, Value};

impl Predicate {
    /// Lower the predicate into a MongoDB query document.
    ///
    /// Object ids are written in extended JSON (`{"$oid": "..."}`) so drivers can convert them
    /// into their native id type.
    pub fn to_mongo(&self) -> JsonValue {
        match self {
            Predicate::True => JsonValue::Object(Map::new()),
            Predicate::And(predicates) => {
                json!({ "$and": predicates.iter().map(Predicate::to_mongo).collect::<Vec<_>>() })
            }
            Predicate::Or(predicates) => {
                json!({ "$or": predicates.iter().map(Predicate::to_mongo).collect::<Vec<_>>() })
            }
            Predicate::FieldEq { field, value } => single(field, value.to_mongo()),
            Predicate::FieldIn { field, values } => single(
                field,
                json!({ "$in": values.iter().map(Value::to_mongo).collect::<Vec<_>>() }),
            ),
            Predicate::AnyElement { field, predicate } => {
                single(field, json!({ "$elemMatch": predicate.to_mongo() }))
            }
        }
    }
}

impl Value {
    pub fn to_mongo(&self) -> JsonValue {
        match self {
            Value::String(value) => JsonValue::String(value.clone()),
            Value::ObjectId(id) => json!({ "$oid": id.to_hex() }),
        }
    }
}

fn single(field: &str, value: JsonValue) -> JsonValue {
    let mut map = Map::new();
    map.insert(field.to_string(), value);
    JsonValue::Object(map)
}
