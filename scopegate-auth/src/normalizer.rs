// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key id normalizers for the supported storage id types.
use std::str::FromStr;

use scopegate_core::{ObjectId, ObjectIdError, Value};
use thiserror::Error;

use crate::traits::IdNormalizer;

/// Storage with 12-byte object ids, raw ids must be 24 hex characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectIdNormalizer;

impl IdNormalizer for ObjectIdNormalizer {
    type Error = IdError;

    fn normalize(&self, raw: &str) -> Result<Value, Self::Error> {
        let id = ObjectId::from_str(raw)
            .map_err(|err| IdError::InvalidObjectId(raw.to_string(), err))?;
        Ok(Value::ObjectId(id))
    }
}

/// Storage with opaque string ids, any non-blank id is kept as it is (trimmed).
#[derive(Clone, Copy, Debug, Default)]
pub struct StringIdNormalizer;

impl IdNormalizer for StringIdNormalizer {
    type Error = IdError;

    fn normalize(&self, raw: &str) -> Result<Value, Self::Error> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Value::String(id.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum IdError {
    #[error("id is empty")]
    Empty,

    #[error("\"{0}\" is not a valid object id: {1}")]
    InvalidObjectId(String, ObjectIdError),
}
